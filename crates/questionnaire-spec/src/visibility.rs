use crate::answers::Answers;
use crate::expr::evaluate_conditional_logic;
use crate::questionnaire::Questionnaire;

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

pub fn resolve_visibility(questionnaire: &Questionnaire, answers: &Answers) -> VisibilityMap {
    questionnaire
        .fields()
        .iter()
        .map(|field| {
            (
                field.key().to_string(),
                evaluate_conditional_logic(field.logic(), answers),
            )
        })
        .collect()
}
