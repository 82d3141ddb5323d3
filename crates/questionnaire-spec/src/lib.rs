#![allow(missing_docs)]

pub mod answers;
pub mod expr;
pub mod questionnaire;
pub mod render;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerValue, Answers, ValidationError, ValidationResult};
pub use expr::{
    Condition, ConditionOperator, ConditionValue, ConditionalLogic, LogicAction, LogicOperator,
    evaluate_condition, evaluate_conditional_logic,
};
pub use questionnaire::{CompiledField, Questionnaire, SchemaError};
pub use render::{
    RenderField, RenderGroup, RenderPayload, RenderProgress, RenderStatus, build_render_payload,
    render_json_ui, render_text,
};
pub use spec::{Field, FieldGroup, FieldOption, FieldType, QuestionnaireSchema, ValidationRules};
pub use validate::{validate, validate_field};
pub use visibility::{VisibilityMap, resolve_visibility};
