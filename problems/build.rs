use std::{
    env,
    error::Error,
    fs::{self, File},
    io::Write,
    path::PathBuf,
    process,
};

struct ProblemDef {
    /// The code users see in diagnostics. Stable between releases so
    /// that documentation stays valid.
    code: String,
    /// The name of the enumeration member. Internal only.
    name: String,
    /// A message describing the type of problem.
    message: String,
}

fn read_defs() -> Result<Vec<ProblemDef>, Box<dyn Error>> {
    println!("cargo:rerun-if-changed=resources/problem-codes.csv");

    let mut src_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    src_path.push("resources");
    src_path.push("problem-codes.csv");

    let src = fs::read_to_string(src_path)?;

    let mut defs = vec![];
    let mut rdr = csv::Reader::from_reader(src.as_bytes());
    for result in rdr.records() {
        let record = result?;
        let field = |idx: usize| {
            record
                .get(idx)
                .map(str::to_string)
                .ok_or_else(|| format!("Record {:?} is not valid at column {}", record, idx))
        };
        defs.push(ProblemDef {
            code: field(0)?,
            name: field(1)?,
            message: field(2)?,
        });
    }
    Ok(defs)
}

fn create_problems() -> Result<(), Box<dyn Error>> {
    let defs = read_defs()?;

    let mut out_path = PathBuf::from(env::var("OUT_DIR")?);
    fs::create_dir_all(out_path.clone())?;
    out_path.push("problems.rs");
    let mut out = File::create(out_path)?;

    out.write_all(b"#[derive(Clone, Copy, Debug, PartialEq, Eq)]\n")?;
    out.write_all(b"pub enum Problem {\n")?;
    for def in &defs {
        writeln!(out, "    {},", def.name)?;
    }
    out.write_all(b"}\n\n")?;

    out.write_all(b"impl Problem {\n")?;

    out.write_all(b"    /// Returns the code for the particular problem as a string.\n")?;
    out.write_all(b"    pub fn code(&self) -> &'static str {\n")?;
    out.write_all(b"        match self {\n")?;
    for def in &defs {
        writeln!(out, "            Problem::{} => \"{}\",", def.name, def.code)?;
    }
    out.write_all(b"        }\n    }\n\n")?;

    out.write_all(b"    /// Returns the message for the particular problem as a string.\n")?;
    out.write_all(b"    /// The message is constant across instances of the problem.\n")?;
    out.write_all(b"    pub fn message(&self) -> &'static str {\n")?;
    out.write_all(b"        match self {\n")?;
    for def in &defs {
        writeln!(
            out,
            "            Problem::{} => \"{}\",",
            def.name, def.message
        )?;
    }
    out.write_all(b"        }\n    }\n}\n")?;

    out.flush()?;
    Ok(())
}

fn main() {
    if let Err(err) = create_problems() {
        println!("problem generating problems.rs: {}", err);
        process::exit(1);
    }
}
