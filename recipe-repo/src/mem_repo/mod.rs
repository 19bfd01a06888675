use crate::ingredient_repo::Ingredient;
use crate::nutrient_repo::{NewNutrient, Nutrient};
use crate::recipe_repo::{Recipe, RecipeIngredient};
use crate::reconcile;
use crate::tag_repo::Tag;
use crate::user_repo::{User, UserId};
use crate::Repos;
use anyhow::anyhow;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod ingredient_repo;
mod nutrient_repo;
mod recipe_repo;
mod tag_repo;
mod user_repo;

trait OwnedRow {
    fn owner(&self) -> UserId;
}

struct TagRow {
    user_id: UserId,
    name: String,
}

struct NutrientRow {
    user_id: UserId,
    name: String,
    grams: Decimal,
}

struct IngredientRow {
    user_id: UserId,
    name: String,
    image: Option<String>,
    nutrients: Vec<i32>,
}

struct RecipeRow {
    user_id: UserId,
    title: String,
    time_minutes: i32,
    price: Decimal,
    description: String,
    link: String,
    image: Option<String>,
    tags: Vec<i32>,
    ingredients: Vec<i32>,
}

macro_rules! owned_row {
    ($($row:ty),*) => {
        $(impl OwnedRow for $row {
            fn owner(&self) -> UserId {
                self.user_id
            }
        })*
    };
}

owned_row!(TagRow, NutrientRow, IngredientRow, RecipeRow);

/// Every row the user owns, in id order.
fn owned_rows<'a, R: OwnedRow>(
    rows: &'a BTreeMap<i32, R>,
    user: UserId,
) -> impl DoubleEndedIterator<Item = (i32, &'a R)> + 'a {
    rows.iter()
        .filter(move |(_, row)| row.owner() == user)
        .map(|(id, row)| (*id, row))
}

/// The row with `id` if `user` owns it. Rows of other users are indistinguishable from missing
/// ones.
fn owned_row<R: OwnedRow>(rows: &BTreeMap<i32, R>, user: UserId, id: i32) -> Option<&R> {
    rows.get(&id).filter(|row| row.owner() == user)
}

fn owned_row_mut<R: OwnedRow>(
    rows: &mut BTreeMap<i32, R>,
    user: UserId,
    id: i32,
) -> Option<&mut R> {
    rows.get_mut(&id).filter(|row| row.owner() == user)
}

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    tags: BTreeMap<i32, TagRow>,
    nutrients: BTreeMap<i32, NutrientRow>,
    ingredients: BTreeMap<i32, IngredientRow>,
    recipes: BTreeMap<i32, RecipeRow>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn tag(&self, id: i32) -> Tag {
        let row = self
            .tags
            .get(&id)
            .expect("associated tags should exist");
        Tag::new(id, row.name.clone())
    }

    fn nutrient(&self, id: i32) -> Nutrient {
        let row = self
            .nutrients
            .get(&id)
            .expect("associated nutrients should exist");
        Nutrient::new(id, row.name.clone(), row.grams)
    }

    fn ingredient(&self, id: i32) -> Ingredient {
        let row = self
            .ingredients
            .get(&id)
            .expect("ingredient ids should be valid");
        let nutrients = row.nutrients.iter().map(|n| self.nutrient(*n)).collect();
        Ingredient::new(id, row.name.clone(), row.image.clone(), nutrients)
    }

    fn recipe(&self, id: i32) -> Recipe {
        let row = self.recipes.get(&id).expect("recipe ids should be valid");
        let ingredients = row
            .ingredients
            .iter()
            .map(|i| {
                let ingredient = self
                    .ingredients
                    .get(i)
                    .expect("associated ingredients should exist");
                RecipeIngredient {
                    id: *i,
                    name: ingredient.name.clone(),
                }
            })
            .collect();
        Recipe {
            id,
            title: row.title.clone(),
            description: row.description.clone(),
            price: row.price,
            time_minutes: row.time_minutes,
            link: row.link.clone(),
            tags: row.tags.iter().map(|t| self.tag(*t)).collect(),
            ingredients,
            image: row.image.clone(),
        }
    }

    fn resolve_tags(&mut self, user: UserId, names: Vec<String>) -> Vec<i32> {
        let existing = owned_rows(&self.tags, user)
            .map(|(id, row)| (row.name.clone(), id))
            .collect();
        let resolution = reconcile::resolve(existing, names, |n| n.clone());
        let created: Vec<i32> = resolution
            .new_rows()
            .iter()
            .map(|name| {
                let id = self.next_id();
                self.tags.insert(
                    id,
                    TagRow {
                        user_id: user,
                        name: name.clone(),
                    },
                );
                id
            })
            .collect();
        resolution.into_ids(&created)
    }

    fn resolve_ingredients(&mut self, user: UserId, names: Vec<String>) -> Vec<i32> {
        let existing = owned_rows(&self.ingredients, user)
            .map(|(id, row)| (row.name.clone(), id))
            .collect();
        let resolution = reconcile::resolve(existing, names, |n| n.clone());
        let created: Vec<i32> = resolution
            .new_rows()
            .iter()
            .map(|name| {
                let id = self.next_id();
                self.ingredients.insert(
                    id,
                    IngredientRow {
                        user_id: user,
                        name: name.clone(),
                        image: None,
                        nutrients: Vec::new(),
                    },
                );
                id
            })
            .collect();
        resolution.into_ids(&created)
    }

    fn resolve_nutrients(&mut self, user: UserId, nutrients: Vec<NewNutrient>) -> Vec<i32> {
        let existing = owned_rows(&self.nutrients, user)
            .map(|(id, row)| ((row.name.clone(), row.grams.normalize()), id))
            .collect();
        let resolution = reconcile::resolve(existing, nutrients, |n| n.natural_key());
        let created: Vec<i32> = resolution
            .new_rows()
            .iter()
            .map(|nutrient| {
                let id = self.next_id();
                self.nutrients.insert(
                    id,
                    NutrientRow {
                        user_id: user,
                        name: nutrient.name.clone(),
                        grams: nutrient.grams,
                    },
                );
                id
            })
            .collect();
        resolution.into_ids(&created)
    }

    fn is_tag_assigned(&self, tag_id: i32) -> bool {
        self.recipes.values().any(|r| r.tags.contains(&tag_id))
    }

    fn is_ingredient_assigned(&self, ingredient_id: i32) -> bool {
        self.recipes
            .values()
            .any(|r| r.ingredients.contains(&ingredient_id))
    }
}

/// Sorts name descending, ties broken by id descending.
fn sort_by_name_desc<T>(items: &mut [T], key: impl Fn(&T) -> (&str, i32)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

pub struct MemRepo {
    state: RwLock<State>,
}

impl MemRepo {
    pub fn new() -> MemRepo {
        MemRepo {
            state: RwLock::new(State::default()),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemRepo {
    fn default() -> Self {
        MemRepo::new()
    }
}

pub fn create_repos() -> Repos {
    let repo = Arc::new(MemRepo::new());

    Repos {
        user_repo: repo.clone(),
        recipe_repo: repo.clone(),
        tag_repo: repo.clone(),
        ingredient_repo: repo.clone(),
        nutrient_repo: repo,
    }
}
