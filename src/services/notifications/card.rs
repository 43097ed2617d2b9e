//! MessageCard formatting for chat webhooks.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ChatNotificationRequest;

const CARD_TYPE: &str = "MessageCard";
const CARD_CONTEXT: &str = "https://schema.org/extensions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    pub theme_color: String,
    pub summary: String,
    pub title: String,
    pub text: String,
    pub sections: Vec<CardSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub potential_action: Vec<CardAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardSection {
    pub activity_title: String,
    pub activity_subtitle: String,
    pub text: String,
    pub facts: Vec<CardFact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CardFact {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CardAction {
    #[serde(rename = "@type")]
    pub action_type: String,
    pub name: String,
    pub targets: Vec<ActionTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionTarget {
    pub os: String,
    pub uri: String,
}

/// Build the card for `request`, stamped with the current time.
pub fn format_card(request: &ChatNotificationRequest) -> MessageCard {
    format_card_at(request, Timestamp::now())
}

pub fn format_card_at(request: &ChatNotificationRequest, sent_at: Timestamp) -> MessageCard {
    let severity = request.severity();
    let title = request.title().to_string();

    // Severity is always the last fact row
    let mut facts: Vec<CardFact> = request
        .additional_facts
        .iter()
        .flatten()
        .map(|(name, value)| CardFact {
            name: name.clone(),
            value: value.clone(),
        })
        .collect();
    facts.push(CardFact {
        name: "Severity".to_string(),
        value: severity.display_name().to_string(),
    });

    let potential_action = if request.url.trim().is_empty() {
        Vec::new()
    } else {
        vec![CardAction {
            action_type: "OpenUri".to_string(),
            name: "View Details".to_string(),
            targets: vec![ActionTarget {
                os: "default".to_string(),
                uri: request.url.clone(),
            }],
        }]
    };

    MessageCard {
        card_type: CARD_TYPE.to_string(),
        context: CARD_CONTEXT.to_string(),
        theme_color: severity.color().to_string(),
        summary: title.clone(),
        title: title.clone(),
        text: request.message.clone(),
        sections: vec![CardSection {
            activity_title: title,
            activity_subtitle: format!("Sent at {} UTC", sent_at.strftime("%Y-%m-%d %H:%M:%S")),
            text: request.message.clone(),
            facts,
        }],
        potential_action,
    }
}
