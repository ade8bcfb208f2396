use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::entities::{category, sub_subcategory, subcategory};

/// Classification tier, always passed explicitly. Creating or addressing a
/// node never infers the tier from what its parent id happens to resolve to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Category,
    Subcategory,
    SubSubcategory,
}

impl FromStr for Tier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(Tier::Category),
            "subcategory" => Ok(Tier::Subcategory),
            "sub_subcategory" => Ok(Tier::SubSubcategory),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Category => write!(f, "category"),
            Tier::Subcategory => write!(f, "subcategory"),
            Tier::SubSubcategory => write!(f, "sub_subcategory"),
        }
    }
}

/// Lowercased, dash-separated slug. Empty when the name holds no ASCII
/// alphanumerics at all, which node creation rejects.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[derive(Serialize)]
pub struct CategoryTree {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_id: Option<i32>,
    pub display_order: i32,
    pub is_active: bool,
    pub product_count: i32,
    pub subcategories: Vec<SubcategoryTree>,
}

#[derive(Serialize)]
pub struct SubcategoryTree {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_id: Option<i32>,
    pub display_order: i32,
    pub is_active: bool,
    pub product_count: i32,
    pub sub_subcategories: Vec<SubSubcategoryTree>,
}

#[derive(Serialize)]
pub struct SubSubcategoryTree {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_id: Option<i32>,
    pub display_order: i32,
    pub is_active: bool,
    pub product_count: i32,
}

/// Nests the three flat levels, sorted by display_order then name at every
/// level. Children whose parent is absent from the input (filtered out or
/// deactivated) are dropped, so an inactive parent hides its subtree.
pub fn assemble_tree(
    mut categories: Vec<category::Model>,
    mut subcategories: Vec<subcategory::Model>,
    mut sub_subcategories: Vec<sub_subcategory::Model>,
) -> Vec<CategoryTree> {
    categories.sort_by(|a, b| {
        (a.display_order, a.name.as_str()).cmp(&(b.display_order, b.name.as_str()))
    });
    subcategories.sort_by(|a, b| {
        (a.display_order, a.name.as_str()).cmp(&(b.display_order, b.name.as_str()))
    });
    sub_subcategories.sort_by(|a, b| {
        (a.display_order, a.name.as_str()).cmp(&(b.display_order, b.name.as_str()))
    });

    let mut leaves_by_parent: HashMap<i32, Vec<SubSubcategoryTree>> = HashMap::new();
    for leaf in sub_subcategories {
        leaves_by_parent
            .entry(leaf.parent_subcategory_id)
            .or_default()
            .push(SubSubcategoryTree {
                id: leaf.id,
                name: leaf.name,
                slug: leaf.slug,
                description: leaf.description,
                image_id: leaf.image_id,
                display_order: leaf.display_order,
                is_active: leaf.is_active,
                product_count: leaf.product_count,
            });
    }

    let mut subs_by_parent: HashMap<i32, Vec<SubcategoryTree>> = HashMap::new();
    for sub in subcategories {
        let children = leaves_by_parent.remove(&sub.id).unwrap_or_default();
        subs_by_parent
            .entry(sub.parent_category_id)
            .or_default()
            .push(SubcategoryTree {
                id: sub.id,
                name: sub.name,
                slug: sub.slug,
                description: sub.description,
                image_id: sub.image_id,
                display_order: sub.display_order,
                is_active: sub.is_active,
                product_count: sub.product_count,
                sub_subcategories: children,
            });
    }

    categories
        .into_iter()
        .map(|cat| {
            let children = subs_by_parent.remove(&cat.id).unwrap_or_default();
            CategoryTree {
                id: cat.id,
                name: cat.name,
                slug: cat.slug,
                description: cat.description,
                image_id: cat.image_id,
                display_order: cat.display_order,
                is_active: cat.is_active,
                product_count: cat.product_count,
                subcategories: children,
            }
        })
        .collect()
}
