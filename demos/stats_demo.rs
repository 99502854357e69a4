use chain_hash::HashSet;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    /// Number of values to insert.
    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    count: u64,

    /// Bucket count to start from. Omit to grow from an empty set.
    #[arg(short = 'b', long = "buckets")]
    buckets: Option<usize>,

    /// Rehash to this bucket count after filling.
    #[arg(short = 'r', long = "rehash")]
    rehash: Option<usize>,
}

fn print_histogram(histogram: &[usize]) {
    println!("=== Bucket Length Histogram ===");
    for (len, buckets) in histogram.iter().enumerate() {
        if *buckets > 0 {
            println!("{len:>4} values: {buckets} buckets");
        }
    }
}

fn main() {
    let args = Args::parse();

    let mut set: HashSet<u64> = match args.buckets {
        Some(buckets) => HashSet::with_buckets(buckets),
        None => HashSet::new(),
    };
    println!("Starting bucket count: {}", set.bucket_count());

    let mut growths = 0;
    for value in 0..args.count {
        let before = set.bucket_count();
        set.insert(value);
        if set.bucket_count() != before {
            growths += 1;
        }
    }

    println!(
        "Inserted {} values, {} growths, {} buckets",
        set.len(),
        growths,
        set.bucket_count()
    );

    if let Some(bucket_count) = args.rehash {
        match set.try_rehash(bucket_count) {
            Ok(()) => println!("Rehashed to {} buckets", set.bucket_count()),
            Err(e) => println!("Rehash to {bucket_count} buckets failed: {e}"),
        }
    }

    print_histogram(&set.bucket_histogram());
    set.debug_stats().print();
}
