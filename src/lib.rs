pub mod academic_year;
pub mod calendar_emitter;
pub mod class_session;
pub mod classifier;
pub mod config;
pub mod day_of_week;
pub mod error;
pub mod form_state;
pub mod login;
pub mod normalizer;
pub mod output;
pub mod page;
pub mod page_store;
pub mod pipeline;
pub mod portal_scraper;
pub mod ratelimit;
pub mod requests;
pub mod row_extractor;
pub mod scraping_context;
pub mod text_manipulators;

pub use academic_year::AcademicYear;
pub use calendar_emitter::{CalendarEmitter, CalendarFile};
pub use class_session::ClassSession;
pub use classifier::{Category, ClassifiedSession};
pub use config::{CalendarConfig, PageSource};
pub use day_of_week::DayOfWeek;
pub use error::{PipelineError, RejectReason, RowRejected};
pub use normalizer::RecordNormalizer;
pub use page::Page;
pub use pipeline::{PipelineOutput, RunReport};
pub use row_extractor::RawRow;
pub use scraping_context::ScrapingContext;
