pub mod export;
pub mod gateway;
pub mod grade;
pub mod login;
pub mod print;

pub use crate::domain::model::{
    Credentials, GradeAverage, LoginOutcome, MissingScorePolicy, Period, PeriodScores,
    PrintOutcome, Score, User,
};
pub use crate::domain::ports::{
    ConfigProvider, Exporter, LoginObserver, PrintHost, PrintWindow, SessionStore,
};
pub use crate::utils::error::Result;
