use crate::config::Config;
use crate::mangle::{
    auto_inc_primary_key, column_names, filter_columns_by_auto_increment,
    filter_columns_by_default, generate_param_flags, has_element, plural, primary_key_func_sig,
    singular, where_primary_key,
};
use crate::relationship::{RelationshipDeriver, ToManyTexts, ToOneTexts, receiver};
use crate::schema::{Schema, SchemaError, Table};
use crate::sql::Dialect;
use log::debug;

/// Everything the emitter needs to write code for a schema.
#[derive(Debug, Clone)]
pub struct GenerationIR {
    pub dialect: Dialect,
    pub uses_last_insert_id: bool,
    pub tables: Vec<TableIR>,
}

#[derive(Debug, Clone)]
pub struct TableIR {
    pub name: String,
    pub singular: String,
    pub plural: String,
    pub type_name: String,
    pub slice: String,
    pub receiver: String,
    pub is_join_table: bool,
    pub columns: Vec<ColumnIR>,
    pub primary_key: Option<PrimaryKeyIR>,
    /// Columns the client supplies on insert.
    pub insert_columns: String,
    pub insert_params: String,
    /// Columns read back after insert.
    pub returning_columns: String,
    pub auto_increment_columns: String,
    pub to_one: Vec<ToOneTexts>,
    pub to_many: Vec<ToManyTexts>,
}

#[derive(Debug, Clone)]
pub struct ColumnIR {
    pub name: String,
    pub field: String,
    pub typ: String,
    /// Type as declared in the dump.
    pub db_type: String,
    pub nullable: bool,
    pub has_default: bool,
    pub auto_increment: bool,
    pub is_pk: bool,
    pub is_fk: bool,
}

#[derive(Debug, Clone)]
pub struct PrimaryKeyIR {
    pub name: String,
    pub columns: Vec<String>,
    pub func_sig: String,
    pub where_clause: String,
    /// Set when the database assigns the key on insert.
    pub auto_increment: Option<String>,
}

impl GenerationIR {
    pub fn from_schema(schema: &Schema, config: &Config) -> Result<Self, SchemaError> {
        let deriver = RelationshipDeriver::new(schema, config);

        let tables = schema
            .tables()
            .iter()
            .filter(|t| config.includes(&t.name))
            .map(|t| table_ir(t, &deriver, config))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GenerationIR {
            dialect: config.dialect,
            uses_last_insert_id: config.dialect.capabilities().uses_last_insert_id,
            tables,
        })
    }
}

fn table_ir(
    table: &Table,
    deriver: &RelationshipDeriver,
    config: &Config,
) -> Result<TableIR, SchemaError> {
    let initialisms = &config.initialisms;
    let pkey_columns = table
        .primary_key
        .as_ref()
        .map(|p| p.columns.as_slice())
        .unwrap_or_default();
    let fkey_columns = table
        .foreign_keys
        .iter()
        .map(|f| f.column.as_str())
        .collect::<Vec<_>>();

    let columns = table
        .columns
        .iter()
        .map(|c| ColumnIR {
            name: c.name.clone(),
            field: initialisms.title_case(&c.name),
            typ: c.typ.clone(),
            db_type: c.db_type.clone(),
            nullable: c.nullable,
            has_default: c.has_default(),
            auto_increment: c.is_auto_increment(config.dialect),
            is_pk: has_element(&c.name, pkey_columns),
            is_fk: has_element(&c.name, &fkey_columns),
        })
        .collect::<Vec<_>>();

    let primary_key = match &table.primary_key {
        Some(pkey) => Some(PrimaryKeyIR {
            name: pkey.name.clone(),
            columns: pkey.columns.clone(),
            func_sig: primary_key_func_sig(&table.columns, &pkey.columns)?,
            where_clause: where_primary_key(&pkey.columns, 1)?,
            auto_increment: auto_inc_primary_key(&table.columns, Some(pkey)).map(str::to_string),
        }),
        None => None,
    };

    let insert_count = columns.iter().filter(|c| !c.has_default).count();

    let to_one = table
        .foreign_keys
        .iter()
        .map(|f| deriver.to_one(table, f))
        .collect::<Result<Vec<_>, _>>()?;
    let to_many = table
        .to_many_relationships
        .iter()
        .map(|r| deriver.to_many(table, r))
        .collect::<Result<Vec<_>, _>>()?;

    let singular_name = singular(&table.name);
    debug!(
        "{}: columns [{}], {} to-one, {} to-many",
        table.name,
        column_names(&table.columns).join(", "),
        to_one.len(),
        to_many.len()
    );

    Ok(TableIR {
        name: table.name.clone(),
        plural: plural(&table.name),
        type_name: initialisms.title_case(&singular_name),
        slice: format!("{}Slice", initialisms.camel_case(&singular_name)),
        receiver: receiver(&table.name),
        singular: singular_name,
        is_join_table: table.is_join_table,
        columns,
        primary_key,
        insert_columns: filter_columns_by_default(&table.columns, false),
        insert_params: generate_param_flags(insert_count, 1),
        returning_columns: filter_columns_by_default(&table.columns, true),
        auto_increment_columns: filter_columns_by_auto_increment(&table.columns, config.dialect),
        to_one,
        to_many,
    })
}
