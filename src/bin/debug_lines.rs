use pdf_outline::{assemble_document, classify, FragmentSource, OutlineConfig, PdfSource};
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: debug-lines <pdf_path> [max_page | min-max]");
        std::process::exit(1);
    }

    // 1-indexed page range
    let range = args.get(2).map(|s| s.as_str()).unwrap_or("1-3");
    let (min_page, max_page): (usize, usize) = if let Some((a, b)) = range.split_once('-') {
        (a.parse().unwrap_or(1), b.parse().unwrap_or(3))
    } else {
        (1, range.parse().unwrap_or(3))
    };

    let config = OutlineConfig::default();
    let pages = PdfSource::open(&args[1])
        .and_then(|source| source.pages())
        .expect("Failed to extract");
    let lines = assemble_document(&pages, &config);
    let classification = classify(&lines, &config);

    println!("title: {:?}", classification.title);
    println!("median font size: {:.1}", classification.median_font_size);
    println!();

    for page in min_page..=max_page {
        let page_lines: Vec<_> = lines
            .iter()
            .zip(&classification.roles)
            .filter(|(l, _)| l.page_index + 1 == page)
            .collect();
        println!("=== PAGE {} ({} lines) ===", page, page_lines.len());
        for (line, role) in page_lines {
            println!(
                "  {:12} y={:7.1}..{:7.1} fs={:5.1} bold={:5} font={:20} text={:?}",
                format!("{:?}", role),
                line.bbox.y0,
                line.bbox.y1,
                line.font_size,
                line.is_bold,
                line.font_name,
                line.text
            );
        }
        println!();
    }
}
