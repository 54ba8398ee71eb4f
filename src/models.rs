//! Message model and response types for the Mandrill API.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// An outbound email.
///
/// Built by value with chainable methods and borrowed by
/// [`Client::send`](crate::Client::send) or
/// [`Client::send_template`](crate::Client::send_template). Unset fields are
/// left out of the request body entirely.
///
/// # Examples
/// ```
/// use mandrill_client::Message;
///
/// let msg = Message::with_recipient("someone@example.com", "Someone")
///     .subject("Hello")
///     .from_email("noreply@example.com")
///     .html("<p>Hi there</p>")
///     .add_tags(["welcome"]);
/// assert_eq!(msg.to.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    /// Full HTML content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Plain text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Sender address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    /// Sender display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    /// Recipients, in send order.
    pub to: Vec<Recipient>,
    /// Merge variables applied to every recipient.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global_merge_vars: Vec<Variable>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Message level metadata, searchable in Mandrill.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipient_metadata: Vec<RecipientMetadata>,
    /// Subaccount the message is delivered through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaccount: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Extra headers (most headers are allowed).
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_language: Option<MergeLanguage>,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a message with a single `to` recipient.
    pub fn with_recipient(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new().add_recipient(email, name)
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn from_email(mut self, email: impl Into<String>) -> Self {
        self.from_email = Some(email.into());
        self
    }

    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = Some(name.into());
        self
    }

    /// Select the merge tag syntax used in the content.
    pub fn merge_language(mut self, language: MergeLanguage) -> Self {
        self.merge_language = Some(language);
        self
    }

    /// Append a `to` recipient. An empty `name` is not sent.
    pub fn add_recipient(self, email: impl Into<String>, name: impl Into<String>) -> Self {
        self.add_recipient_with_type(email, name, RecipientType::To)
    }

    /// Append a recipient with an explicit header type.
    ///
    /// The address is not validated here; Mandrill rejects bad ones at send time.
    pub fn add_recipient_with_type(
        mut self,
        email: impl Into<String>,
        name: impl Into<String>,
        kind: RecipientType,
    ) -> Self {
        let name = name.into();
        self.to.push(Recipient {
            email: email.into(),
            name: (!name.is_empty()).then_some(name),
            kind,
        });
        self
    }

    /// Append a single global merge variable.
    pub fn add_global_merge_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.global_merge_vars.push(Variable::new(name, value));
        self
    }

    /// Append one global merge variable per entry.
    ///
    /// Entry order is not significant to Mandrill and is not preserved for
    /// unordered inputs such as `HashMap`.
    pub fn add_global_merge_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.global_merge_vars.extend(Variable::from_pairs(vars));
        self
    }

    /// Append tags, keeping call order.
    pub fn add_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set a metadata field, replacing any previous value for `key`.
    pub fn add_metadata_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Append metadata for one recipient.
    ///
    /// Entries are never merged: calling this twice for the same recipient
    /// sends two entries.
    pub fn add_recipient_metadata<I, K, V>(mut self, recipient: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.recipient_metadata.push(RecipientMetadata {
            recipient: recipient.into(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        });
        self
    }

    /// Set the subaccount, replacing any previous one.
    pub fn set_subaccount(mut self, subaccount: impl Into<String>) -> Self {
        self.subaccount = Some(subaccount.into());
        self
    }

    /// Append a file attachment. May be called any number of times.
    pub fn add_attachment(
        mut self,
        content: impl Into<Vec<u8>>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        self.attachments.push(Attachment {
            mime_type: mime_type.into(),
            name: name.into(),
            content: content.into(),
        });
        self
    }

    /// Set a header, replacing any previous value for `name`.
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Header a recipient is listed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    #[default]
    To,
    Cc,
    Bcc,
}

/// A single message recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: RecipientType,
}

/// Metadata attached to a single recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientMetadata {
    /// Must match the email of one of the message's recipients.
    #[serde(rename = "rcpt")]
    pub recipient: String,
    pub values: HashMap<String, Value>,
}

/// A file attached to a message.
///
/// Holds raw bytes; they are base64 encoded when the message is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub name: String,
    #[serde(serialize_with = "serialize_base64")]
    pub content: Vec<u8>,
}

impl Attachment {
    /// The content as it is sent on the wire.
    pub fn encoded_content(&self) -> String {
        BASE64.encode(&self.content)
    }
}

fn serialize_base64<S: Serializer>(content: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(content))
}

/// Merge tag syntax understood by Mandrill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeLanguage {
    Mailchimp,
    Handlebars,
}

/// A `{name, content}` pair, the wire form of merge vars and template content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub content: Value,
}

impl Variable {
    pub fn new(name: impl Into<String>, content: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert key/value pairs into variables, one per pair.
    pub(crate) fn from_pairs<I, K, V>(pairs: I) -> Vec<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        pairs.into_iter().map(|(k, v)| Self::new(k, v)).collect()
    }
}

/// Per-recipient outcome of a send call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendResult {
    pub email: String,
    pub status: SendStatus,
    /// Set when `status` is `rejected`, e.g. `hard-bounce` or `spam`.
    #[serde(rename = "reject_reason", default)]
    pub rejection_reason: Option<String>,
    /// Mandrill's unique message id.
    #[serde(rename = "_id", default)]
    pub id: String,
}

/// Sending status of a single recipient.
///
/// A rejected recipient is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Queued,
    Scheduled,
    Rejected,
    Invalid,
    #[serde(other)]
    Unknown,
}
