//! Shopping list aggregation.
//!
//! [`ShoppingReport::aggregate`] turns the ingredient lines of every queued
//! recipe into one line per ingredient, summing the amounts. Grouping is by
//! ingredient id: two catalog entries named "Salt" with different units are
//! two report lines.
//!
//! Lines are ordered by ingredient name, ties broken by ingredient id, so the
//! same input always renders the same text.

use std::{
    collections::{BTreeMap, HashSet, btree_map::Entry},
    fmt::{self, Write},
};

/// One ingredient line of a queued recipe, as read from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngredientLine {
    pub recipe_id: i32,
    pub ingredient_id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Total amount of one ingredient across the shopping list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatedLine {
    pub ingredient_id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

impl From<IngredientLine> for AggregatedLine {
    fn from(line: IngredientLine) -> Self {
        Self {
            ingredient_id: line.ingredient_id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            total_amount: i64::from(line.amount),
        }
    }
}

impl fmt::Display for AggregatedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {}",
            self.name, self.measurement_unit, self.total_amount
        )
    }
}

/// The aggregated shopping list of a user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShoppingReport {
    lines: Vec<AggregatedLine>,
}

impl ShoppingReport {
    /// Name of the downloadable file.
    pub const FILE_NAME: &'static str = "shop-list.txt";
    /// Content type of [`render`](Self::render).
    pub const CONTENT_TYPE: &'static str = "text/plain";

    /// Group `lines` by ingredient and sum their amounts.
    ///
    /// A line repeated for the same `(recipe_id, ingredient_id)` pair is
    /// counted once: a recipe holds each ingredient at most once, so a
    /// repetition can only come from a join that duplicated rows.
    pub fn aggregate<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = IngredientLine>,
    {
        let mut seen = HashSet::new();
        let mut groups: BTreeMap<i32, AggregatedLine> = BTreeMap::new();

        for line in lines {
            if !seen.insert((line.recipe_id, line.ingredient_id)) {
                continue;
            }
            match groups.entry(line.ingredient_id) {
                Entry::Occupied(mut group) => {
                    group.get_mut().total_amount += i64::from(line.amount);
                }
                Entry::Vacant(slot) => {
                    slot.insert(AggregatedLine::from(line));
                }
            }
        }

        let mut lines: Vec<AggregatedLine> = groups.into_values().collect();
        lines.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.ingredient_id.cmp(&b.ingredient_id))
        });

        Self { lines }
    }

    pub fn lines(&self) -> &[AggregatedLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render the report as plain text, one `"{name} ({unit}) - {amount} "`
    /// line per ingredient.
    ///
    /// The space before each newline is part of the historical file format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            // Writing into a `String` cannot fail.
            let _ = writeln!(out, "{line} ");
        }
        out
    }
}
