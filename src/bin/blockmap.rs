//! Blockmap command-line driver
//!
//! Runs line commands against a memory manager, from a script file or stdin.

use anyhow::{bail, Context};
use blockmap_rs::{
    AllocationError, EngineConfig, MemoryManager, ProcessId, StrategyKind, TagPalette,
};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const MAP_ROW_WIDTH: usize = 64;
const DEFAULT_LOG_FILTER: &str = "info";

const HELP: &str = "\
Commands:
  create <name> <size> [strategy] [tag]   allocate a process (strategy: first|next|best|worst)
  delete <id>                             release a process
  map                                     show block occupancy
  list                                    list live processes
  stats                                   show memory statistics
  runs                                    show free runs and fragmentation
  journal                                 show the operation history
  help                                    show this message
  quit                                    exit";

#[derive(Parser, Debug)]
#[command(name = "blockmap")]
#[command(about = "Fixed-block memory allocation simulator")]
struct Args {
    /// TOML config file (flags below override its values)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Total simulated memory in bytes
    #[arg(short = 'm', long)]
    total_memory: Option<u64>,

    /// Block size in bytes
    #[arg(short = 'b', long)]
    block_size: Option<u64>,

    /// Strategy used when a create command names none
    #[arg(short = 's', long)]
    strategy: Option<StrategyKind>,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print list and stats output as JSON
    #[arg(long)]
    json: bool,
}

struct Session {
    memory: MemoryManager,
    palette: TagPalette,
    json: bool,
}

enum Step {
    Continue(String),
    Quit,
}

impl Session {
    fn new(memory: MemoryManager, json: bool) -> Self {
        Session {
            memory,
            palette: TagPalette::new(),
            json,
        }
    }

    fn execute(&mut self, line: &str) -> anyhow::Result<Step> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            return Ok(Step::Continue(String::new()));
        };

        let output = match command.to_lowercase().as_str() {
            "create" | "new" => self.create(rest)?,
            "delete" | "rm" => self.delete(rest)?,
            "map" => self.render_map(),
            "list" | "ls" => self.render_list()?,
            "stats" => self.render_stats()?,
            "runs" => self.render_runs(),
            "journal" => self.render_journal(),
            "help" => HELP.to_string(),
            "quit" | "exit" => return Ok(Step::Quit),
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(Step::Continue(output))
    }

    fn create(&mut self, args: &[&str]) -> anyhow::Result<String> {
        let [name, size, extra @ ..] = args else {
            bail!("usage: create <name> <size> [strategy] [tag]");
        };
        if name.trim().is_empty() {
            bail!("process name must not be empty");
        }

        let size: i64 = size
            .parse()
            .with_context(|| format!("invalid size '{size}'"))?;
        if size <= 0 {
            return Err(AllocationError::InvalidSize { size_bytes: size }.into());
        }

        let strategy = match extra.first() {
            Some(s) => s.parse::<StrategyKind>()?,
            None => self.memory.config().default_strategy,
        };
        let tag = extra
            .get(1)
            .map(|t| t.to_string())
            .unwrap_or_else(|| self.palette.peek().to_string());

        let record = self
            .memory
            .create_process(*name, size as u64, tag, strategy)?;
        self.palette.advance();

        Ok(format!("Created process {record} using {strategy}-fit"))
    }

    fn delete(&mut self, args: &[&str]) -> anyhow::Result<String> {
        let [id] = args else {
            bail!("usage: delete <id>");
        };
        let id: ProcessId = id.parse().with_context(|| format!("invalid id '{id}'"))?;
        let record = self.memory.delete_process(id)?;
        Ok(format!("Deleted process {record}"))
    }

    /// One character per block: `.` free, otherwise a letter per owning process
    fn render_map(&self) -> String {
        let cells: String = (0..self.memory.total_blocks())
            .map(|block| match self.memory.owner_of(block) {
                Some(owner) => process_glyph(owner.id),
                None => '.',
            })
            .collect();

        let mut out = String::new();
        for (row, chunk) in cells.as_bytes().chunks(MAP_ROW_WIDTH).enumerate() {
            let text = String::from_utf8_lossy(chunk);
            out.push_str(&format!("{:>6} {text}\n", row * MAP_ROW_WIDTH));
        }
        out.push_str(&format!("Total: {} blocks", self.memory.total_blocks()));
        out
    }

    fn render_list(&self) -> anyhow::Result<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(&self.memory.list_processes())?);
        }

        let mut out = format!(
            "{:>4}  {:<3} {:<16} {:>10} {:>7} {:>7}  {}",
            "id", "", "name", "bytes", "start", "blocks", "tag"
        );
        for p in self.memory.processes() {
            out.push_str(&format!(
                "\n{:>4}  {:<3} {:<16} {:>10} {:>7} {:>7}  {}",
                p.id,
                process_glyph(p.id),
                p.name,
                p.requested_size_bytes,
                p.start_block,
                p.block_count,
                p.tag
            ));
        }
        Ok(out)
    }

    fn render_stats(&self) -> anyhow::Result<String> {
        let stats = self.memory.stats();
        if self.json {
            return Ok(serde_json::to_string_pretty(&stats)?);
        }

        Ok(format!(
            "Total memory:  {} bytes ({} blocks of {} bytes)\n\
             Occupied:      {} blocks ({} bytes)\n\
             Free:          {} blocks ({} bytes)\n\
             Occupancy:     {}%",
            stats.total_memory_bytes,
            stats.total_blocks,
            stats.block_size_bytes,
            stats.occupied_blocks,
            stats.used_bytes,
            stats.free_blocks,
            stats.free_bytes,
            stats.occupancy_label()
        ))
    }

    fn render_runs(&self) -> String {
        let report = self.memory.fragmentation();
        let mut out: Vec<String> = self
            .memory
            .free_runs()
            .iter()
            .map(|run| format!("blocks {}..{} ({} free)", run.start, run.end(), run.length))
            .collect();
        out.push(format!(
            "{} free runs, largest {}, fragmentation {:.2}, next-fit cursor {}",
            report.free_runs,
            report.largest_free_run,
            report.fragmentation_ratio,
            self.memory.next_fit_cursor()
        ));
        out.join("\n")
    }

    fn render_journal(&self) -> String {
        self.memory
            .journal()
            .entries()
            .map(|e| {
                let status = if e.succeeded { "ok" } else { "failed" };
                format!("{} {:<6} {}", e.timestamp.format("%H:%M:%S%.3f"), status, e.message)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn process_glyph(id: ProcessId) -> char {
    const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    GLYPHS[((id.get() - 1) % GLYPHS.len() as u64) as usize] as char
}

fn build_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(total) = args.total_memory {
        config.total_memory_bytes = total;
    }
    if let Some(block) = args.block_size {
        config.block_size_bytes = block;
    }
    if let Some(strategy) = args.strategy {
        config.default_strategy = strategy;
    }
    Ok(config)
}

/// `RUST_LOG` directives when given, otherwise `info` for everything
fn log_filter(directives: Option<&str>) -> EnvFilter {
    match directives {
        Some(dirs) if !dirs.trim().is_empty() => EnvFilter::new(dirs),
        _ => EnvFilter::new(DEFAULT_LOG_FILTER),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let memory = MemoryManager::from_config(config)?;
    let mut session = Session::new(memory, args.json);

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => {
            info!("Running script {:?}", path);
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match session.execute(line) {
            Ok(Step::Continue(text)) if text.is_empty() => {}
            Ok(Step::Continue(text)) => writeln!(out, "{text}")?,
            Ok(Step::Quit) => break,
            Err(err) => writeln!(out, "error: {err:#}")?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(MemoryManager::new(1024, 128).unwrap(), false)
    }

    fn run(session: &mut Session, line: &str) -> anyhow::Result<String> {
        match session.execute(line)? {
            Step::Continue(text) => Ok(text),
            Step::Quit => Ok("<quit>".to_string()),
        }
    }

    #[test]
    fn test_create_and_map() {
        let mut s = session();
        let msg = run(&mut s, "create P1 300").unwrap();
        assert!(msg.starts_with("Created process P1 (id 1"));

        run(&mut s, "create P2 128 first").unwrap();
        let map = run(&mut s, "map").unwrap();
        assert!(map.contains("AAAB...."));
    }

    #[test]
    fn test_palette_assigns_tags_in_order() {
        let mut s = session();
        run(&mut s, "create P1 1").unwrap();
        run(&mut s, "create P2 99999").unwrap_err();
        run(&mut s, "create P3 1").unwrap();

        let tags: Vec<String> = s.memory.processes().map(|p| p.tag.clone()).collect();
        assert_eq!(tags, vec!["#3B82F6", "#EF4444"]);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut s = session();
        let err = run(&mut s, "create P1 -5").unwrap_err();
        assert!(err.to_string().contains("Invalid size: -5"));

        assert!(run(&mut s, "create P1 10 buddy").is_err());
        assert!(run(&mut s, "delete x").is_err());
        assert!(run(&mut s, "frobnicate").is_err());

        let err = run(&mut s, "delete 7").unwrap_err();
        assert!(err.to_string().contains("Process not found: 7"));
    }

    #[test]
    fn test_log_filter_honours_rust_log_level() {
        assert_eq!(log_filter(Some("debug")).to_string().to_lowercase(), "debug");
        assert_eq!(log_filter(None).to_string().to_lowercase(), "info");
        assert_eq!(log_filter(Some("  ")).to_string().to_lowercase(), "info");

        let scoped = log_filter(Some("blockmap_rs=trace")).to_string().to_lowercase();
        assert_eq!(scoped, "blockmap_rs=trace");
    }

    #[test]
    fn test_quit() {
        let mut s = session();
        assert_eq!(run(&mut s, "quit").unwrap(), "<quit>");
    }

    #[test]
    fn test_json_stats() {
        let mut s = Session::new(MemoryManager::new(1024, 128).unwrap(), true);
        run(&mut s, "create P1 512").unwrap();
        let json = run(&mut s, "stats").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["occupied_blocks"], 4);
        assert_eq!(value["occupancy_percent"], 50.0);
    }
}
