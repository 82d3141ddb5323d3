pub mod field;
pub mod schema;

pub use field::{Field, FieldOption, FieldType, ValidationRules};
pub use schema::{FieldGroup, QuestionnaireSchema};
