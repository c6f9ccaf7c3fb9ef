//! Typed construction records, the input boundary of the engine.
//!
//! An external decoder (the loader crate, for JSON documents) produces one
//! record per declared entity or expression. Each record type enumerates
//! its recognized fields; `deny_unknown_fields` makes an unrecognized
//! field a decode error, which the loader reports as a schema violation
//! naming the field.
//!
//! The engine is agnostic to the concrete syntax carrying these records.

use serde::Deserialize;

use crate::entity::Qualifier;

/// One model document: its forward imports and the library it declares.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentRecord {
    /// Documents that must be fully loaded before this one.
    #[serde(default)]
    pub imports: Vec<String>,
    pub library: LibraryRecord,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryRecord {
    pub name: String,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

/// A tagged top-level declaration. One tag per entity kind.
#[derive(Debug, Clone, Deserialize)]
pub enum ItemRecord {
    #[serde(rename = "ENUMERATION")]
    Enumeration(EnumRecord),
    #[serde(rename = "STATEMACHINE")]
    Statemachine(StatemachineRecord),
    #[serde(rename = "STATUS")]
    Status(StatusRecord),
    #[serde(rename = "FB")]
    FunctionBlock(FunctionBlockRecord),
    #[serde(rename = "CONFIG")]
    Config(StructRecord),
    #[serde(rename = "STRUCT")]
    Struct(StructRecord),
    #[serde(rename = "PROCESS")]
    Process(ProcessRecord),
}

impl ItemRecord {
    pub fn name(&self) -> &str {
        match self {
            ItemRecord::Enumeration(record) => &record.name,
            ItemRecord::Statemachine(record) => &record.name,
            ItemRecord::Status(record) => &record.name,
            ItemRecord::FunctionBlock(record) => &record.name,
            ItemRecord::Config(record) | ItemRecord::Struct(record) => &record.name,
            ItemRecord::Process(record) => &record.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    #[serde(rename = "pointsToType")]
    pub points_to_type: Option<String>,
    pub initial: Option<ExprRecord>,
    pub comment: Option<String>,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub arguments: Vec<VariableRecord>,
    pub address: Option<String>,
    pub expand: Option<bool>,
}

impl VariableRecord {
    /// A record with just a name and type, the shape most synthesized
    /// variables use.
    pub fn typed(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: Some(ty.to_string()),
            points_to_type: None,
            initial: None,
            comment: None,
            qualifiers: vec![],
            arguments: vec![],
            address: None,
            expand: None,
        }
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn with_initial(mut self, initial: ExprRecord) -> Self {
        self.initial = Some(initial);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructRecord {
    pub name: String,
    #[serde(default)]
    pub items: Vec<VariableRecord>,
    pub comment: Option<String>,
    #[serde(rename = "typeOf")]
    pub type_of: Option<OneOrMany<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodRecord {
    pub name: String,
    pub comment: Option<String>,
    #[serde(rename = "inputArgs", default)]
    pub input_args: Vec<VariableRecord>,
    #[serde(rename = "inOutArgs", default)]
    pub in_out_args: Vec<VariableRecord>,
    #[serde(rename = "localArgs", default)]
    pub local_args: Vec<VariableRecord>,
    #[serde(rename = "returnType")]
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionBlockRecord {
    pub name: String,
    #[serde(rename = "typeOf")]
    pub type_of: Option<OneOrMany<String>>,
    pub extends: Option<String>,
    pub comment: Option<String>,
    #[serde(rename = "in", default)]
    pub var_in: Vec<VariableRecord>,
    #[serde(rename = "out", default)]
    pub var_out: Vec<VariableRecord>,
    #[serde(rename = "inout", default)]
    pub var_inout: Vec<VariableRecord>,
    pub render: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusRecord {
    pub name: String,
    #[serde(rename = "typeOf")]
    pub type_of: Option<OneOrMany<String>>,
    pub render: Option<bool>,
    #[serde(default)]
    pub variables: Vec<VariableRecord>,
    #[serde(default)]
    pub states: Vec<StateRecord>,
}

/// One state of a status block: a boolean output driven by an expression.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateRecord {
    pub name: String,
    pub comment: Option<String>,
    pub expr: ExprRecord,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatemachineRecord {
    pub name: String,
    pub extends: Option<String>,
    #[serde(rename = "typeOf")]
    pub type_of: Option<OneOrMany<String>>,
    pub render: Option<bool>,
    /// Read-write interface variables.
    #[serde(default)]
    pub variables: Vec<VariableRecord>,
    #[serde(rename = "variables_read_only", default)]
    pub variables_read_only: Vec<VariableRecord>,
    #[serde(rename = "variables_hidden", default)]
    pub variables_hidden: Vec<VariableRecord>,
    #[serde(default)]
    pub references: Vec<VariableRecord>,
    #[serde(default)]
    pub local: Vec<VariableRecord>,
    pub statuses: Option<Vec<VariableRecord>>,
    pub parts: Option<Vec<VariableRecord>>,
    pub processes: Option<Vec<VariableRecord>>,
    #[serde(default)]
    pub methods: Vec<MethodRecord>,
    /// Variables to invoke each cycle, with optional argument bindings.
    #[serde(default)]
    pub calls: Vec<CallDirectiveRecord>,
    #[serde(rename = "disabled_calls", default)]
    pub disabled_calls: Vec<String>,
}

/// Declares that a member is invoked by the synthesized call wiring and
/// which of its fields are bound first.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallDirectiveRecord {
    pub name: String,
    #[serde(default)]
    pub assigns: Vec<BindingRecord>,
}

/// Binds a field of the callee to an expression around a call.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingRecord {
    pub target: String,
    pub value: ExprRecord,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessRecord {
    pub name: String,
    pub extends: Option<String>,
    #[serde(default)]
    pub arguments: Vec<VariableRecord>,
    #[serde(default)]
    pub variables: Vec<VariableRecord>,
    #[serde(rename = "variables_hidden", default)]
    pub variables_hidden: Vec<VariableRecord>,
    #[serde(default)]
    pub references: Vec<VariableRecord>,
}

/// An expression position in a document.
///
/// Bare scalars are path references or raw initial values; everything
/// else is a tagged operation or typed literal.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExprRecord {
    Bool(bool),
    Number(f64),
    Path(String),
    Op(Box<OpRecord>),
}

impl ExprRecord {
    pub fn path(text: &str) -> Self {
        ExprRecord::Path(text.to_string())
    }
}

/// A tagged operation or typed literal. One tag per operator.
#[derive(Debug, Clone, Deserialize)]
pub enum OpRecord {
    #[serde(rename = "ASSIGN")]
    Assign(Vec<ExprRecord>),
    #[serde(rename = "AND")]
    And(Vec<ExprRecord>),
    #[serde(rename = "OR")]
    Or(Vec<ExprRecord>),
    #[serde(rename = "EQ")]
    Eq(Vec<ExprRecord>),
    #[serde(rename = "GT")]
    Gt(Vec<ExprRecord>),
    #[serde(rename = "LT")]
    Lt(Vec<ExprRecord>),
    #[serde(rename = "GE")]
    Ge(Vec<ExprRecord>),
    #[serde(rename = "LE")]
    Le(Vec<ExprRecord>),
    #[serde(rename = "SUM")]
    Sum(Vec<ExprRecord>),
    #[serde(rename = "SUB")]
    Sub(Vec<ExprRecord>),
    #[serde(rename = "MUL")]
    Mul(Vec<ExprRecord>),
    #[serde(rename = "DIV")]
    Div(Vec<ExprRecord>),
    #[serde(rename = "POW")]
    Pow(Vec<ExprRecord>),
    #[serde(rename = "NOT")]
    Not(Vec<ExprRecord>),
    #[serde(rename = "ADR")]
    Adr(Vec<ExprRecord>),
    #[serde(rename = "DEREF")]
    Deref(Vec<ExprRecord>),
    #[serde(rename = "NEG")]
    Neg(Vec<ExprRecord>),
    #[serde(rename = "ABS")]
    Abs(Vec<ExprRecord>),
    #[serde(rename = "BOOL")]
    Bool(String),
    #[serde(rename = "INT8")]
    Int8(String),
    #[serde(rename = "UINT8")]
    UInt8(String),
    #[serde(rename = "INT16")]
    Int16(String),
    #[serde(rename = "UINT16")]
    UInt16(String),
    #[serde(rename = "DOUBLE")]
    Double(String),
    #[serde(rename = "STRING")]
    Str(String),
    #[serde(rename = "SUMMARIZE_BUSY")]
    SummarizeBusy(Vec<String>),
    #[serde(rename = "SUMMARIZE_GOOD")]
    SummarizeGood(Vec<String>),
    #[serde(rename = "SUMMARIZE_WARN")]
    SummarizeWarn(Vec<String>),
    #[serde(rename = "SUMMARIZE_GOOD_OR_DISABLED")]
    SummarizeGoodOrDisabled(Vec<String>),
}

/// A field that accepts a single value or a list of them (`typeOf`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}
