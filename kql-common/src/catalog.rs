#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closed set of scalar data types carried (but not enforced) across
/// operators, mirroring the KQL literal/column type universe.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataTypeName {
    /// `string`
    String,
    /// `number` (integer or real)
    Number,
    /// `bool`
    Boolean,
    /// `datetime`
    DateTime,
    /// `timespan`
    Timespan,
    /// `guid`
    Guid,
    /// `dynamic` / untyped
    Dynamic,
}

/// A single column of a table in the schema catalog.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnSchema {
    /// Column name, as it appears in KQL source.
    pub name: String,
    /// The column's declared type.
    pub data_type: DataTypeName,
    /// Whether the column may hold nulls.
    pub nullable: bool,
    /// Human-readable description surfaced by completion/hover.
    pub description: Option<String>,
    /// Example values, used by completion to suggest literals.
    pub examples: Vec<String>,
}

/// A table entry in the schema catalog.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableSchema {
    /// Table name, as it appears after `|` pipe chains or at query start.
    pub name: String,
    /// The table's columns.
    pub columns: Vec<ColumnSchema>,
    /// Example queries against this table, surfaced by completion.
    pub sample_queries: Vec<String>,
}

/// The broad category a scalar/aggregation function belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FunctionCategory {
    /// Aggregation function, valid inside `summarize`.
    Aggregation,
    /// Scalar function, valid anywhere an expression is.
    Scalar,
    /// Window function.
    Window,
    /// Table-returning function.
    Table,
}

/// A single named parameter of a function schema entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParamSchema {
    /// Parameter name.
    pub name: String,
    /// Parameter's expected type.
    pub data_type: DataTypeName,
    /// Whether the parameter can be omitted.
    pub optional: bool,
    /// Human-readable description.
    pub description: Option<String>,
}

/// A function entry in the schema catalog.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FunctionSchema {
    /// Function name, e.g. `count`, `strlen`, `ago`.
    pub name: String,
    /// Declared parameters, in order.
    pub params: Vec<ParamSchema>,
    /// The function's return type.
    pub return_type: DataTypeName,
    /// Which clause(s) the function is meaningful in.
    pub category: FunctionCategory,
    /// Example invocations, surfaced by completion.
    pub examples: Vec<String>,
}

/// A binary operator entry in the schema catalog.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperatorSchema {
    /// Operator spelling, e.g. `==`, `contains`.
    pub op: String,
    /// Expected left operand type.
    pub left_type: DataTypeName,
    /// Expected right operand type.
    pub right_type: DataTypeName,
    /// Resulting type.
    pub return_type: DataTypeName,
    /// Human-readable description.
    pub description: String,
}

/// The broad category a keyword belongs to, for completion ranking.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KeywordCategory {
    /// A post-pipe command keyword, e.g. `where`, `summarize`.
    Command,
    /// A clause sub-keyword, e.g. `by`, `asc`, `desc`.
    Clause,
    /// A join-kind modifier, e.g. `inner`, `leftanti`.
    JoinKind,
}

/// A keyword entry in the schema catalog.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeywordSchema {
    /// Keyword spelling.
    pub keyword: String,
    /// The keyword's category.
    pub category: KeywordCategory,
    /// Human-readable description.
    pub description: String,
}

/// A read-only, process-wide catalog of tables, functions, operators, and
/// keywords. Constructed once by the embedder and never mutated afterwards
/// -- lookups are case-insensitive on name and safe for concurrent readers
/// since the catalog holds no interior mutability.
#[derive(Clone, Debug, Default)]
pub struct SchemaCatalog {
    tables: BTreeMap<String, TableSchema>,
    functions: BTreeMap<String, FunctionSchema>,
    operators: BTreeMap<String, OperatorSchema>,
    keywords: BTreeMap<String, KeywordSchema>,
}

impl SchemaCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table, keyed case-insensitively by its name.
    pub fn add_table(&mut self, table: TableSchema) {
        self.tables.insert(table.name.to_lowercase(), table);
    }

    /// Registers a function, keyed case-insensitively by its name.
    pub fn add_function(&mut self, function: FunctionSchema) {
        self.functions.insert(function.name.to_lowercase(), function);
    }

    /// Registers a binary operator, keyed case-insensitively by its spelling.
    pub fn add_operator(&mut self, operator: OperatorSchema) {
        self.operators.insert(operator.op.to_lowercase(), operator);
    }

    /// Registers a keyword, keyed case-insensitively by its spelling.
    pub fn add_keyword(&mut self, keyword: KeywordSchema) {
        self.keywords.insert(keyword.keyword.to_lowercase(), keyword);
    }

    /// Looks up a table by name, case-insensitively.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(&name.to_lowercase())
    }

    /// Looks up a function by name, case-insensitively.
    pub fn function(&self, name: &str) -> Option<&FunctionSchema> {
        self.functions.get(&name.to_lowercase())
    }

    /// Looks up an operator by spelling, case-insensitively.
    pub fn operator(&self, op: &str) -> Option<&OperatorSchema> {
        self.operators.get(&op.to_lowercase())
    }

    /// Looks up a keyword by spelling, case-insensitively.
    pub fn keyword(&self, kw: &str) -> Option<&KeywordSchema> {
        self.keywords.get(&kw.to_lowercase())
    }

    /// All registered table names, in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.values().map(|t| t.name.as_str())
    }

    /// All registered tables, in sorted-by-name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    /// All registered functions, in sorted-by-name order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSchema> {
        self.functions.values()
    }

    /// All registered functions of a given category, in sorted-by-name order.
    pub fn functions_by_category(
        &self,
        category: FunctionCategory,
    ) -> impl Iterator<Item = &FunctionSchema> {
        self.functions.values().filter(move |f| f.category == category)
    }

    /// All registered keywords, in sorted-by-name order.
    pub fn keywords(&self) -> impl Iterator<Item = &KeywordSchema> {
        self.keywords.values()
    }

    /// All registered operators, in sorted-by-spelling order.
    pub fn operators(&self) -> impl Iterator<Item = &OperatorSchema> {
        self.operators.values()
    }
}
