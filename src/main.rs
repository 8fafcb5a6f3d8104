use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::bail;
use tracing::info;

use statement_map::doj::{self, DojKind, ReasonRelation};
use statement_map::map::Coherence;
use statement_map::parse;
use statement_map::position::Position;

#[derive(Parser, Debug)]
#[command(author, version, about = "Degree-of-justification queries over a statement map")]
struct Cli {
    /// Statement map file.
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Statements to accept.
    #[arg(short, long, value_name = "IDS", value_delimiter = ',')]
    accept: Vec<u32>,

    /// Statements to reject.
    #[arg(short, long, value_name = "IDS", value_delimiter = ',')]
    reject: Vec<u32>,

    /// Justification measure (recall or precision).
    #[arg(short, long, default_value = "recall")]
    kind: String,

    /// Compute "is Q a reason for P" instead of a position's DoJ.
    #[arg(long, value_names = ["P", "Q"], num_args = 2, allow_negative_numbers = true)]
    reason: Option<Vec<i32>>,

    /// Reason relation variant (1 to 4).
    #[arg(long, value_name = "NUM", default_value_t = 1)]
    relation: u32,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = Cli::parse();
    info!("args = {:?}", args);

    let map = parse::parse_map_file(&args.input)?;
    info!("loaded map over {} statements:\n{}", map.num_statements(), map);

    let kind = match args.kind.to_ascii_lowercase().as_str() {
        "recall" => DojKind::Recall,
        "precision" => DojKind::Precision,
        _ => bail!("bad kind '{}'", args.kind),
    };
    let coherence = Coherence::DeductiveInferences;

    if let Some(pq) = &args.reason {
        let relation = match args.relation {
            1 => ReasonRelation::Relation1,
            2 => ReasonRelation::Relation2,
            3 => ReasonRelation::Relation3,
            4 => ReasonRelation::Relation4,
            _ => bail!("bad reason relation '{}'", args.relation),
        };
        let (p, q) = (pq[0], pq[1]);
        for lit in [p, q] {
            if lit == 0 || lit.unsigned_abs() > map.num_statements() {
                bail!("literal {} is outside the map's statements 1..={}", lit, map.num_statements());
            }
        }
        let value = doj::reason(&map, p, q, relation, kind, coherence);
        println!("reason{}({} | {}) = {}", args.relation, p, q, value);
    } else {
        let mut pos = Position::new(map.num_statements());
        for &i in args.accept.iter().chain(args.reject.iter()) {
            if i == 0 || i > map.num_statements() {
                bail!("statement {} is outside the map's statements 1..={}", i, map.num_statements());
            }
        }
        for &i in &args.accept {
            pos.set_accepted(i);
        }
        for &i in &args.reject {
            pos.set_rejected(i);
        }
        info!("position = {}", pos);
        let value = doj::doj(&map, &mut pos, kind, coherence);
        println!("doj[{}]({}) = {}", args.kind, pos, value);
    }

    Ok(())
}
