use serde::{Deserialize, Serialize};

/// A single field of a message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    pub number: i32,
    /// Scalar type name (`int32`, `string`, ...) or a fully-qualified message/enum name.
    pub type_name: String,
    #[serde(default)]
    pub repeated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    #[serde(default)]
    pub nested_messages: Vec<MessageRecord>,
    #[serde(default)]
    pub nested_enums: Vec<EnumRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRecord {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    #[serde(default)]
    pub client_streaming: bool,
    #[serde(default)]
    pub server_streaming: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodRecord>,
}

/// An extension field declared at file scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub name: String,
    /// Fully-qualified name of the message being extended.
    pub extendee: String,
    pub number: i32,
}

/// Structural description of one descriptor file.
///
/// The file name is the unique key; `dependencies` holds the names of the
/// files imported directly by this one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptorRecord {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    #[serde(default)]
    pub enums: Vec<EnumRecord>,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(default)]
    pub extensions: Vec<ExtensionRecord>,
}

impl FileDescriptorRecord {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            ..Default::default()
        }
    }

    /// Prefix `name` with the file's package.
    pub fn qualify(&self, name: &str) -> String {
        if self.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.package, name)
        }
    }

    /// Fully-qualified names of every type-level symbol declared in this file:
    /// messages (including nested ones), enums, services and extensions.
    ///
    /// Methods and fields are not listed; they resolve through their parent.
    pub fn declared_symbols(&self) -> Vec<String> {
        let mut out = Vec::new();
        for message in &self.messages {
            collect_message_symbols(&self.qualify(&message.name), message, &mut out);
        }
        for e in &self.enums {
            out.push(self.qualify(&e.name));
        }
        for service in &self.services {
            out.push(self.qualify(&service.name));
        }
        for ext in &self.extensions {
            out.push(self.qualify(&ext.name));
        }
        out
    }

    pub fn service_names(&self) -> impl Iterator<Item = String> + '_ {
        self.services.iter().map(|s| self.qualify(&s.name))
    }
}

fn collect_message_symbols(fqn: &str, message: &MessageRecord, out: &mut Vec<String>) {
    out.push(fqn.to_string());
    for nested in &message.nested_messages {
        collect_message_symbols(&format!("{}.{}", fqn, nested.name), nested, out);
    }
    for e in &message.nested_enums {
        out.push(format!("{}.{}", fqn, e.name));
    }
}
