use std::sync::Arc;

use neo_gen_core::model::entry::{Prefix, Root, Suffix};
use neo_gen_core::{
    load_blend_lexicon, DefinitionMode, GenerationInput, GenerationKind, Generator, HistoryMode, InMemoryFavorites,
    InMemoryHistory, Lexicon, LexiconStore,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows generation latency and cache population
    env_logger::init();

    // Load the seed lexicon from the "data" directory (.csv files)
    // Load automatically lexicon.bin if existing
    let lexicon = Lexicon::new("./data")?;
    let history = Arc::new(InMemoryHistory::new(100));

    // The blend lexicon is only needed by the simple mode
    let app = Generator::new(lexicon, Arc::clone(&history)).with_blender(load_blend_lexicon("./data"));

    println!("Available tags: {}", app.store().distinct_tags().join(", "));

    // Default input: random composition, technical definitions, filters on
    let mut input = GenerationInput::default();
    input.save_to_history = true;

    // Favour medical and scientific entries; entries sharing no tag are never drawn
    input.set_tags(["médecine", "science"]);

    // How much each matching tag multiplies the base weight (must be >= 0)
    input.set_weighting_intensity(2.0)?;
    match input.set_weighting_intensity(-1.0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{e}"),
    }

    for i in 0..5 {
        let result = app.generate(&input)?;
        println!(
            "Generated word {}: {} ({}) [{}] plausibility {:.1}",
            i + 1,
            result.word,
            result.definition,
            result.decomposition,
            result.plausibility
        );
    }

    // Same provenance, other display settings: no new draw
    input.mode = DefinitionMode::Poetic;
    let last = app.generate(&input)?;
    let raw = app.recompute(&last, DefinitionMode::Technical, false);
    println!("Poetic: {} ({})", last.word, last.definition);
    println!("Technical, unfiltered: {} ({})", raw.word, raw.definition);

    // Workshop: compose hand-picked morphemes
    let prefix = Prefix::new("manual-p", "trans-", "à travers");
    let root = Root::new("manual-r", "son-", "son");
    let suffix = Suffix::new("manual-s", "-ique", "relatif à").with_pos("adj");
    let manual = app.compose_manual(&prefix, &root, &suffix, &input);
    println!("Workshop: {} ({})", manual.word, manual.definition);

    // Favorites keep the provenance, so they can be recomputed later
    let favorites = InMemoryFavorites::new();
    favorites.add(&manual, HistoryMode::Manual);
    if let Some(provenance) = favorites.get(&manual.word).and_then(|f| f.provenance) {
        let poetic = provenance.compose(DefinitionMode::Poetic, true);
        println!("Favorite, poetic: {} ({})", poetic.word, poetic.definition);
    }

    // Simple mode: blend two everyday words
    input.kind = GenerationKind::Simple;
    input.set_tags(["nature"]);
    for _ in 0..3 {
        let blend = app.generate(&input)?;
        println!("Blend: {} <- {}", blend.word, blend.decomposition);
    }

    println!("History ({} entries):", history.len());
    for entry in history.recent(5) {
        println!("  #{} [{}] {}: {}", entry.id, entry.mode, entry.word, entry.definition);
    }

    Ok(())
}
