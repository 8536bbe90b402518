use crate::types::Category;

/// Assign an establishment to a category by keyword substring match.
///
/// Categories are tried in `Category::all()` order and the first one with a
/// matching keyword wins; names matching nothing are `Other`. This is a
/// heuristic and misclassifies some names (e.g. anything containing `VILA`).
pub fn categorize(establishment: &str) -> Category {
    let name = establishment.to_uppercase();
    Category::all()
        .iter()
        .copied()
        .find(|category| category.keywords().iter().any(|keyword| name.contains(keyword)))
        .unwrap_or(Category::Other)
}
