use chrono::NaiveDate;
use fake::faker::lorem::en::Sentence;
use fake::{Fake, Faker};
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use trackify_repo::transaction_repo::{NewTransaction, TransactionType};

pub trait Generator<T> {
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

struct FakeGenerator<F> {
    fake: F,
}

impl<F> FakeGenerator<F> {
    fn boxed(fake: F) -> Box<FakeGenerator<F>> {
        Box::new(FakeGenerator { fake })
    }
}

impl<T: fake::Dummy<F>, F> Generator<T> for FakeGenerator<F> {
    fn gen(&mut self) -> T {
        self.fake.fake()
    }
}

/// Non-negative amounts with two decimal places.
struct FakeAmount;

impl Generator<Decimal> for FakeAmount {
    fn gen(&mut self) -> Decimal {
        Decimal::new((0..1_000_000).fake::<i64>(), 2)
    }
}

#[allow(dead_code)]
pub struct NewTransactionGenerator {
    amnt_gen: Box<dyn Generator<Decimal>>,
    type_gen: Box<dyn Generator<TransactionType>>,
    cat_gen: Box<dyn Generator<String>>,
    desc_gen: Box<dyn Generator<Option<String>>>,
    date_gen: Box<dyn Generator<NaiveDate>>,
}

#[allow(dead_code)]
impl NewTransactionGenerator {
    pub fn with_amounts(mut self, amounts: Vec<Decimal>) -> NewTransactionGenerator {
        self.amnt_gen = Predefined::boxed(amounts);
        self
    }

    pub fn with_types(mut self, types: Vec<TransactionType>) -> NewTransactionGenerator {
        self.type_gen = Predefined::boxed(types);
        self
    }

    pub fn with_categories(mut self, categories: Vec<&str>) -> NewTransactionGenerator {
        let categories: Vec<String> = categories.into_iter().map(|s| s.to_string()).collect();
        self.cat_gen = Predefined::boxed(categories);
        self
    }

    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> NewTransactionGenerator {
        self.date_gen = Predefined::boxed(dates);
        self
    }

    pub fn generate(&mut self) -> NewTransaction {
        NewTransaction::new(
            self.amnt_gen.gen(),
            self.type_gen.gen(),
            self.cat_gen.gen(),
            self.desc_gen.gen(),
            self.date_gen.gen(),
        )
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewTransaction> {
        let mut vec = Vec::with_capacity(count);
        for _ in 0..count {
            vec.push(self.generate())
        }
        vec
    }
}

impl Default for NewTransactionGenerator {
    fn default() -> Self {
        NewTransactionGenerator {
            amnt_gen: Box::new(FakeAmount),
            type_gen: RandomSample::boxed(TransactionType::ALL.to_vec()),
            cat_gen: RandomSample::boxed(vec![
                "Misc".to_string(),
                "Groceries".to_string(),
                "Eating Out".to_string(),
                "Transportation".to_string(),
            ]),
            desc_gen: FakeGenerator::boxed(Sentence(5..10)),
            date_gen: FakeGenerator::boxed(Faker),
        }
    }
}
