use serde::{Deserialize, Serialize};

use super::models::Question;

/// Request payload for adding a question to the post's deck
#[derive(Debug, Deserialize)]
pub struct AddQuestionRequest {
    pub question: Question,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionResponse {
    pub question_id: String,
}

/// Request payload for replacing a question in place
#[derive(Debug, Deserialize)]
pub struct EditQuestionRequest {
    pub question: Question,
}

/// Request payload for removing a question
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuestionRequest {
    pub question_id: String,
}
