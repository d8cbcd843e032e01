use enklipse_models::{DEFAULT_NARRATOR, VOICES};

pub fn run() {
    println!("{:<10} {:<10} {:<8} SAMPLE", "ID", "NAME", "PROVIDER");
    for voice in VOICES {
        let marker = if voice.id == DEFAULT_NARRATOR { " (default)" } else { "" };
        println!(
            "{:<10} {:<10} {:<8} {}{}",
            voice.id,
            voice.name,
            voice.provider.as_str(),
            voice.sample_url,
            marker
        );
    }
}
