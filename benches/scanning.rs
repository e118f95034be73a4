use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use plainqr::decode::{Decoder, QrDecoder};
use plainqr::frame::{is_image_file, Frame, Rotation};
use plainqr::is_valid_url;
use rayon::prelude::*;
use walkdir::WalkDir;

const ROTATIONS: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

fn get_parent(path: &Path) -> String {
    path.parent().and_then(|p| p.file_name()).and_then(|s| s.to_str()).unwrap().to_string()
}

fn median(runtime: &mut [u128]) -> u128 {
    runtime.sort_unstable();
    if runtime.len() % 2 == 1 {
        runtime[runtime.len() / 2]
    } else {
        let mid = runtime.len() / 2;
        (runtime[mid - 1] + runtime[mid]) / 2
    }
}

fn print_table<N>(result: &HashMap<String, HashMap<String, N>>, rows: &[&str], columns: &[&str])
where
    N: Display + Debug + Default,
{
    let cell_w = 15;
    let df = N::default();
    let divider = "-".repeat(columns.len() * (cell_w + 2) + 1);

    println!("{divider}");
    let mut header = String::from("| ");
    for c in columns {
        header.push_str(&format!("{c:<cell_w$}| "));
    }
    println!("{header}");
    println!("{divider}");

    for hr in rows {
        let r = result.get(&hr.to_string()).unwrap();
        let mut row = format!("| {hr:<cell_w$}| ");

        for c in columns.iter().skip(1) {
            let cell = r.get(&c.to_string()).unwrap_or(&df);
            row.push_str(&format!("{:<cell_w$.2}| ", cell));
        }

        println!("{row}");
    }

    println!("{divider}");
}

// Scans every image at every rotation, counting decodes and valid links per folder
fn benchmark(dataset_dir: &Path) {
    let image_paths: Vec<PathBuf> = WalkDir::new(dataset_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(is_image_file)
        .map(|e| e.path().to_path_buf())
        .collect();
    println!("Scanning {} image(s) under {}", image_paths.len(), dataset_dir.display());

    let results = Mutex::new(HashMap::<String, HashMap<String, u128>>::new());
    let runtimes = Mutex::new(HashMap::<String, Vec<u128>>::new());

    image_paths.par_iter().for_each(|img_path| {
        let parent = get_parent(img_path);
        let frame = match image::open(img_path) {
            Ok(img) => Frame::from_image(&img).unwrap(),
            Err(e) => {
                eprintln!("\x1b[1;31m[SKIP]\x1b[0m {}: {e}", img_path.display());
                return;
            }
        };

        let mut decoder = QrDecoder::new();
        for rotation in ROTATIONS {
            let frame = frame.clone().with_rotation(rotation);

            let start = Instant::now();
            let decoded = decoder.decode(&frame);
            let elapsed = start.elapsed();

            runtimes.lock().unwrap().entry(parent.clone()).or_default().push(elapsed.as_micros());

            let Ok(payload) = decoded else { continue };
            let mut results = results.lock().unwrap();
            let folder = results.entry(parent.clone()).or_default();
            *folder.entry(rotation.degrees().to_string()).or_default() += 1;
            if is_valid_url(&payload) {
                *folder.entry("links".to_string()).or_default() += 1;
            }
        }
    });

    let mut results = results.into_inner().unwrap();
    let mut runtimes = runtimes.into_inner().unwrap();
    if runtimes.is_empty() {
        println!("No images found");
        return;
    }

    // Calculate totals and median time for each folder
    let mut total: HashMap<String, u128> = HashMap::new();
    for (k, runtime) in runtimes.iter_mut() {
        let v = results.entry(k.clone()).or_default();
        let decoded = ROTATIONS
            .iter()
            .map(|r| v.get(&r.degrees().to_string()).copied().unwrap_or_default())
            .sum::<u128>();
        v.insert("total".to_string(), decoded);
        v.insert("median_time".to_string(), median(runtime));
        v.insert("avg_time".to_string(), runtime.iter().sum::<u128>() / runtime.len() as u128);

        for (kc, vc) in v.iter() {
            *total.entry(kc.to_string()).or_default() += vc;
        }
    }
    let folders = runtimes.len() as u128;
    for key in ["median_time", "avg_time"] {
        if let Some(t) = total.get_mut(key) {
            *t /= folders;
        }
    }
    results.insert("total".to_string(), total);

    let mut rows = results.keys().map(|s| s.as_str()).collect::<Vec<_>>();
    rows.sort_unstable();
    let cols = ["Angles", "0", "90", "180", "270", "total", "links", "median_time", "avg_time"];

    println!("\nResult:");
    print_table(&results, &rows, &cols);
}

fn main() {
    let dataset_dir = std::env::args()
        .skip(1)
        .find(|a| !a.starts_with('-'))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("benches/dataset"));

    let start = Instant::now();
    benchmark(&dataset_dir);
    println!("Time elapsed: {:?}", start.elapsed());
}
