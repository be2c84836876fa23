//! Benchmarks for hybrid recommendation over a synthetic catalog.
//! Run with: cargo bench -p recsys-engine

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use recsys_core::{
    EmbeddingStore, Interaction, InteractionLog, Item, ItemCatalog, RecommendationConfig,
};
use recsys_engine::RecommendationEngine;

const ITEMS: i64 = 2_000;
const USERS: i64 = 1_000;
const CATEGORIES: i64 = 40;
const DIMENSIONS: usize = 64;
const DAY_MS: i64 = 86_400_000;

fn build_engine(rng: &mut StdRng) -> RecommendationEngine {
    let catalog = ItemCatalog::new(
        (0..ITEMS)
            .map(|id| Item::new(id, rng.gen_range(0..CATEGORIES), rng.gen_range(0..60) * DAY_MS))
            .collect(),
    );

    let mut clicks = Vec::new();
    for user in 0..USERS {
        let count = rng.gen_range(0..30);
        for t in 0..count {
            clicks.push(Interaction::new(user, rng.gen_range(0..ITEMS), user, t));
        }
    }
    let interactions = InteractionLog::new(clicks);

    let matrix = Array2::from_shape_fn((ITEMS as usize, DIMENSIONS), |_| rng.gen::<f32>() - 0.5);
    let embeddings = EmbeddingStore::from_catalog_order(&catalog, matrix);

    RecommendationEngine::new(catalog, interactions, embeddings, RecommendationConfig::default())
        .expect("Failed to create engine")
}

fn main() {
    let mut rng = StdRng::seed_from_u64(42);
    let engine = build_engine(&mut rng);
    let users: Vec<i64> = (0..USERS).collect();

    // Warmup
    for &user in users.iter().take(10) {
        engine.recommend(user, 10).unwrap();
    }

    // Benchmark
    let iterations = 2_000;
    let start = std::time::Instant::now();

    for i in 0..iterations {
        let _ = engine.recommend(users[i % users.len()], 10).unwrap();
    }

    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;

    println!("=== Recommendation Benchmark ===");
    println!("Iterations:  {}", iterations);
    println!("Total time:  {:?}", elapsed);
    println!("Per call:    {:?}", per_iter);
    println!("Throughput:  {:.0} requests/sec", iterations as f64 / elapsed.as_secs_f64());
    println!("Catalog:     {} items, {} users", ITEMS, USERS);
}
