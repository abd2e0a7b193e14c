use itertools::Itertools;
use popcorn::app::store::{KvStore, WatchedStore, WATCHED_KEY};
use popcorn::app::watched::WatchedList;
use popcorn::config::load_config;
use std::env;
use std::fs::File;
use std::io::Write;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: cargo run --bin watched_dump [--raw] [--out file]");
        std::process::exit(1);
    }

    let raw = args.iter().any(|a| a == "--raw");
    let out_file: Option<String> = args
        .iter()
        .position(|a| a == "--out")
        .and_then(|i| args.get(i + 1).cloned());

    let db_path = load_config().local_db_path();
    println!("Opening watched store: {}", db_path.display());
    let kv = KvStore::open(&db_path)?;

    let mut output = String::new();
    if raw {
        let value = kv.get(WATCHED_KEY)?.unwrap_or_else(|| "NULL".to_string());
        output.push_str(&format!("--- Key: {} ---\n{}\n", WATCHED_KEY, value));
    } else {
        let list = WatchedList::from_entries(WatchedStore::new(kv).load());
        output.push_str(&format!("--- Watched: {} titles ---\n", list.len()));
        for e in list.entries() {
            output.push_str(&format!(
                "{}\t{} ({})\t{}\n",
                e.imdb_id,
                e.title,
                e.year,
                [
                    format!("imdb={}", e.imdb_rating),
                    format!("user={}", e.user_rating),
                    format!("runtime={}min", e.runtime),
                    format!(
                        "decisions={}",
                        e.count_rating_decisions
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| "-".into())
                    ),
                ]
                .iter()
                .join(" ")
            ));
        }
        let s = list.summary();
        output.push_str(&format!(
            "avg imdb {:.2} | avg user {:.2} | avg runtime {:.0} min\n",
            s.avg_imdb_rating, s.avg_user_rating, s.avg_runtime
        ));
    }

    if let Some(path) = out_file {
        let mut file = File::create(&path)?;
        file.write_all(output.as_bytes())?;
        println!("Exported results to {}", path);
    } else {
        print!("{}", output);
    }

    Ok(())
}
