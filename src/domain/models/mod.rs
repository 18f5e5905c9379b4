pub mod condition;
pub mod config;
pub mod meal;
pub mod page;
pub mod progress;
pub mod workout;

pub use condition::{Condition, ConditionKind, NewCondition};
pub use config::{
    CacheBackend, CacheConfig, Config, DatabaseConfig, LogFormat, LoggingConfig, ServerConfig,
};
pub use meal::{Meal, MealInput};
pub use page::{Page, PageRequest, DEFAULT_LIMIT, MAX_LIMIT};
pub use progress::{Progress, ProgressInput};
pub use workout::{Workout, WorkoutInput};
