//! CLI tool for extracting document outlines from PDFs

use pdf_outline::{extract_outlines_batch, Outline, OutlineConfig, OutlineError};
use serde_json::{json, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut json_output = false;
    let mut out_dir: Option<PathBuf> = None;
    let mut paths: Vec<&String> = Vec::new();

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--json" => json_output = true,
            "--out-dir" => match rest.next() {
                Some(dir) => out_dir = Some(PathBuf::from(dir)),
                None => {
                    eprintln!("Error: --out-dir needs a directory");
                    process::exit(1);
                }
            },
            _ => paths.push(arg),
        }
    }

    if paths.is_empty() {
        eprintln!("Usage: {} <pdf_file>... [--json] [--out-dir <dir>]", args[0]);
        eprintln!();
        eprintln!("Infers the title, heading hierarchy and section content of each PDF.");
        eprintln!("Files are processed in parallel; output follows argument order.");
        eprintln!("With --out-dir, each outline is saved as <dir>/<name>_outline.json.");
        process::exit(1);
    }

    let start = Instant::now();
    let results = extract_outlines_batch(&paths, &OutlineConfig::default());
    let elapsed = start.elapsed();

    let mut exit_code = 0;
    let mut json_docs: Vec<Value> = Vec::new();

    for (path, result) in &results {
        match result {
            Ok(outline) => {
                if let Some(dir) = &out_dir {
                    if let Err(e) = save_outline(dir, path, outline) {
                        eprintln!("Error: {}: {}", path.display(), e);
                        exit_code = exit_code.max(1);
                    }
                }
                if json_output {
                    json_docs.push(outline_json(path, outline));
                } else {
                    print_outline(path, outline);
                }
            }
            Err(e) => {
                exit_code = exit_code.max(match e {
                    OutlineError::SizeLimitExceeded { .. } => 2,
                    _ => 1,
                });
                if json_output {
                    json_docs.push(json!({
                        "file": path.display().to_string(),
                        "error": e.to_string(),
                    }));
                } else {
                    eprintln!("Error: {}: {}", path.display(), e);
                }
            }
        }
    }

    if json_output {
        let value = if json_docs.len() == 1 {
            json_docs.remove(0)
        } else {
            Value::Array(json_docs)
        };
        match serde_json::to_string_pretty(&value) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("Processing time: {}ms", elapsed.as_millis());
    }

    process::exit(exit_code);
}

/// `<dir>/<file stem>_outline.json`
fn output_path(dir: &Path, pdf_path: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    dir.join(format!("{}_outline.json", stem))
}

fn save_outline(dir: &Path, pdf_path: &Path, outline: &Outline) -> std::io::Result<()> {
    let target = output_path(dir, pdf_path);
    let body = serde_json::to_string_pretty(&outline_json(pdf_path, outline))?;
    fs::create_dir_all(dir)?;
    fs::write(&target, body)?;
    eprintln!("Outline written to: {}", target.display());
    Ok(())
}

/// Outline in `{title, outline: [{level: "H1", text, page}]}` form, pages 1-indexed
fn outline_json(path: &Path, outline: &Outline) -> Value {
    let headings: Vec<Value> = outline
        .sections
        .iter()
        .map(|s| {
            json!({
                "level": format!("H{}", s.level),
                "text": s.text,
                "page": s.page_num + 1,
            })
        })
        .collect();

    json!({
        "file": path.display().to_string(),
        "title": outline.title,
        "outline": headings,
        "sections": outline.sections,
    })
}

fn print_outline(path: &Path, outline: &Outline) {
    println!("Document Outline");
    println!("================");
    println!("File: {}", path.display());
    println!("Title: {}", outline.title);
    println!("Sections: {}", outline.sections.len());
    println!();

    for section in &outline.sections {
        let indent = "  ".repeat(section.level.saturating_sub(1) as usize);
        println!(
            "{}H{} {} (page {})",
            indent,
            section.level,
            section.text,
            section.page_num + 1
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_outline::Section;

    fn sample_outline() -> Outline {
        Outline {
            title: "Field Guide".to_string(),
            sections: vec![Section {
                text: "1. Birds".to_string(),
                level: 1,
                page_num: 2,
                content: "Mostly sparrows.".to_string(),
            }],
        }
    }

    #[test]
    fn test_output_path_uses_file_stem() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            output_path(dir, Path::new("/data/reports/q3.final.pdf")),
            PathBuf::from("/tmp/out/q3.final_outline.json")
        );
        assert_eq!(
            output_path(dir, Path::new("guide.pdf")),
            PathBuf::from("/tmp/out/guide_outline.json")
        );
    }

    #[test]
    fn test_outline_json_pages_are_one_based() {
        let value = outline_json(Path::new("guide.pdf"), &sample_outline());
        assert_eq!(value["title"], "Field Guide");
        assert_eq!(value["outline"][0]["level"], "H1");
        assert_eq!(value["outline"][0]["page"], 3);
        assert_eq!(value["sections"][0]["page_num"], 2);
    }

    #[test]
    fn test_save_outline_writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        save_outline(&out, Path::new("/data/guide.pdf"), &sample_outline()).unwrap();

        let written = fs::read_to_string(out.join("guide_outline.json")).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["title"], "Field Guide");
        assert_eq!(value["outline"][0]["text"], "1. Birds");
    }
}
