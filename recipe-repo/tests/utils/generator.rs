use fake::faker::lorem::en::{Sentence, Word, Words};
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use recipe_repo::nutrient_repo::NewNutrient;
use recipe_repo::recipe_repo::NewRecipe;
use rust_decimal::Decimal;

trait Generator<T> {
    fn gen(&mut self) -> T;
}

struct Predefined<T> {
    values: Vec<T>,
    current_pos: usize,
}

impl<T> Predefined<T> {
    fn boxed(values: Vec<T>) -> Box<Predefined<T>> {
        Box::new(Predefined {
            values,
            current_pos: 0,
        })
    }
}

impl<T: Clone> Generator<T> for Predefined<T> {
    fn gen(&mut self) -> T {
        let v = self.values[self.current_pos].clone();
        self.current_pos += 1;
        v
    }
}

struct RandomSample<T> {
    values: Vec<T>,
}

impl<T> RandomSample<T> {
    fn boxed(values: Vec<T>) -> Box<RandomSample<T>> {
        Box::new(RandomSample { values })
    }
}

impl<T: Clone> Generator<T> for RandomSample<T> {
    fn gen(&mut self) -> T {
        self.values.choose(&mut rand::thread_rng()).unwrap().clone()
    }
}

struct FakeTitle;

impl Generator<String> for FakeTitle {
    fn gen(&mut self) -> String {
        Sentence(2..5).fake()
    }
}

struct FakeMinutes;

impl Generator<i32> for FakeMinutes {
    fn gen(&mut self) -> i32 {
        rand::thread_rng().gen_range(1..240)
    }
}

/// Prices with two decimal places, below 1000.
struct FakePrice;

impl Generator<Decimal> for FakePrice {
    fn gen(&mut self) -> Decimal {
        Decimal::new(rand::thread_rng().gen_range(0..99_999), 2)
    }
}

struct FakeNames;

impl Generator<Vec<String>> for FakeNames {
    fn gen(&mut self) -> Vec<String> {
        Words(0..3).fake()
    }
}

#[allow(dead_code)]
pub struct NewRecipeGenerator {
    title_gen: Box<dyn Generator<String>>,
    time_gen: Box<dyn Generator<i32>>,
    price_gen: Box<dyn Generator<Decimal>>,
    tag_gen: Box<dyn Generator<Vec<String>>>,
    ingredient_gen: Box<dyn Generator<Vec<String>>>,
}

#[allow(dead_code)]
impl NewRecipeGenerator {
    pub fn with_titles(mut self, titles: Vec<&str>) -> NewRecipeGenerator {
        let titles = titles.into_iter().map(|s| s.to_string()).collect();
        self.title_gen = Predefined::boxed(titles);
        self
    }

    pub fn with_tags(mut self, tags: Vec<Vec<&str>>) -> NewRecipeGenerator {
        let tags = tags
            .into_iter()
            .map(|t| t.into_iter().map(|s| s.to_string()).collect())
            .collect();
        self.tag_gen = Predefined::boxed(tags);
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Vec<&str>>) -> NewRecipeGenerator {
        let ingredients = ingredients
            .into_iter()
            .map(|i| i.into_iter().map(|s| s.to_string()).collect())
            .collect();
        self.ingredient_gen = Predefined::boxed(ingredients);
        self
    }

    pub fn generate(&mut self) -> NewRecipe {
        let mut new_recipe = NewRecipe::new(
            self.title_gen.gen(),
            self.time_gen.gen(),
            self.price_gen.gen(),
        );
        new_recipe.description = Sentence(3..8).fake();
        new_recipe.tags = self.tag_gen.gen();
        new_recipe.ingredients = self.ingredient_gen.gen();
        new_recipe
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewRecipe> {
        let mut vec = Vec::with_capacity(count);
        for _ in 0..count {
            vec.push(self.generate())
        }
        vec
    }
}

impl Default for NewRecipeGenerator {
    fn default() -> Self {
        NewRecipeGenerator {
            title_gen: Box::new(FakeTitle),
            time_gen: Box::new(FakeMinutes),
            price_gen: Box::new(FakePrice),
            tag_gen: RandomSample::boxed(vec![
                vec![],
                vec!["Vegan".to_string()],
                vec!["Dinner".to_string(), "Thai".to_string()],
                vec!["Breakfast".to_string(), "Quick".to_string()],
            ]),
            ingredient_gen: Box::new(FakeNames),
        }
    }
}

#[allow(dead_code)]
pub fn fake_nutrient() -> NewNutrient {
    let grams = Decimal::new(rand::thread_rng().gen_range(0..10_000), 2);
    NewNutrient::new(Word().fake(), grams)
}
