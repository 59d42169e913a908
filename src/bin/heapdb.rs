use miette::{IntoDiagnostic, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use heap_db::{
    ConditionExt, DEFAULT_LOG_FILTER, Equals, Schema, SchemaRef, SelectQuery, Table,
    Tuple, Value, natural_join,
};

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let inst_schema = {
        let mut schema = Schema::new();
        schema
            .add_key_int("ID")?
            .add_varchar("name", 30)?
            .add_varchar("dept_name", 15)?
            .add_int("salary")?;
        schema.into_ref()
    };
    let dept_schema = {
        let mut schema = Schema::new();
        schema
            .add_key_varchar("dept_name", 15)?
            .add_varchar("building", 12)?
            .add_int("budget")?;
        schema.into_ref()
    };

    let inst = load(
        &inst_schema,
        [
            (22222, "Einstein", "Physics", 95000),
            (12121, "Wu", "Finance", 90000),
            (32343, "El Said", "History", 60000),
            (45565, "Katz", "Comp. Sci.", 75000),
            (98345, "Kim", "Elec. Eng.", 80000),
            (10101, "Srinivasan", "Comp. Sci.", 65000),
            (76766, "Crick", "Biology", 72000),
        ]
        .map(|(id, name, dept, salary): (i32, &str, &str, i32)| {
            vec![id.into(), name.into(), dept.into(), salary.into()]
        }),
    )?;
    let dept = load(
        &dept_schema,
        [
            ("Biology", "Watson", 90000),
            ("Comp. Sci.", "Taylor", 100000),
            ("Elec. Eng.", "Taylor", 85000),
            ("Finance", "Painter", 120000),
            ("Music", "Packard", 80000),
            ("History", "Painter", 50000),
            ("Physics", "Watson", 70000),
        ]
        .map(|(name, building, budget): (&str, &str, i32)| {
            vec![name.into(), building.into(), budget.into()]
        }),
    )?;

    info!(instructors = inst.len(), departments = dept.len(), "tables loaded");
    println!("inst {inst_schema}\n{inst}\n");
    println!("dept {dept_schema}\n{dept}\n");

    let query = SelectQuery::new(Some(["name"]), Equals::new("dept_name", "Comp. Sci."));
    println!("{query}\n{}\n", query.apply(&inst)?);

    let query = SelectQuery::all(
        Equals::new("building", "Taylor").or(Equals::new("building", "Watson").not()),
    );
    println!("{query}\n{}\n", query.apply(&dept)?);

    let joined = natural_join(&inst, &dept)?;
    println!("inst natural join dept {}\n{joined}\n", joined.schema());

    let restored = Schema::deserialize(&inst_schema.serialize())?;
    println!("schema round trip: {restored}");

    let first = inst.iter().next().map(Tuple::serialize).transpose()?;
    if let Some(bytes) = first {
        println!("first tuple encodes to {} bytes", bytes.len());
    }

    Ok(())
}

fn load<const N: usize>(schema: &SchemaRef, rows: [Vec<Value>; N]) -> Result<Table> {
    let mut table = Table::new(schema);
    for values in rows {
        let tuple = Tuple::new(schema, values)?;
        if !table.insert(tuple)? {
            info!("skipped duplicate key");
        }
    }
    Ok(table)
}
