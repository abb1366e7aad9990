use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{delete, get, post, put, web, App, HttpResponse, HttpServer, Responder};
use log::{debug, error, info, warn};
use serde::Deserialize;

use neo_gen_core::{
	load_blend_lexicon, Config, DefinitionMode, GenerationInput, GenerationKind, GenerationResult, Generator, GeneratorError,
	HistoryMode, InMemoryFavorites, InMemoryHistory, Lexicon, LexiconStore,
};

/// Environment variable naming the TOML configuration file.
const CONFIG_ENV: &str = "NEO_GEN_CONFIG";

const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Query parameters of the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	kind: Option<String>,
	mode: Option<String>,
	filters: Option<bool>,
	intensity: Option<f64>,
	tags: Option<String>, // comma-separated
	save: Option<bool>,
}

#[derive(Deserialize)]
struct SearchParams {
	kind: Option<String>,
	q: Option<String>,
}

#[derive(Deserialize)]
struct HistoryParams {
	limit: Option<usize>,
	word: Option<String>,
}

#[derive(Deserialize)]
struct RecomputeBody {
	result: GenerationResult,
	mode: Option<String>,
	filters: Option<bool>,
}

#[derive(Deserialize)]
struct FavoriteBody {
	result: GenerationResult,
	mode: Option<HistoryMode>,
}

struct SharedData {
	config: Config,
	generator: Generator<Lexicon, Arc<InMemoryHistory>>,
	favorites: InMemoryFavorites,
}

fn parse_mode(mode: Option<&str>, default: DefinitionMode) -> Result<DefinitionMode, String> {
	match mode {
		None => Ok(default),
		Some(m) => DefinitionMode::parse(m).ok_or_else(|| format!("Unknown definition mode '{m}'")),
	}
}

impl GenerateParams {
	/// Builds a generation input on top of the configured defaults.
	fn to_input(&self, config: &Config) -> Result<GenerationInput, String> {
		let mut input = GenerationInput::from_config(config);
		if let Some(kind) = &self.kind {
			input.kind = GenerationKind::parse(kind).ok_or_else(|| format!("Unknown kind '{kind}', expected 'random' or 'simple'"))?;
		}
		input.mode = parse_mode(self.mode.as_deref(), input.mode)?;
		if let Some(filters) = self.filters {
			input.use_filters = filters;
		}
		if let Some(save) = self.save {
			input.save_to_history = save;
		}
		if let Some(intensity) = self.intensity {
			input.set_weighting_intensity(intensity).map_err(|e| e.to_string())?;
		}
		if let Some(tags) = &self.tags {
			input.set_tags(tags.split(','));
		}
		Ok(input)
	}
}

fn generation_error(e: GeneratorError) -> HttpResponse {
	error!("Generation failed: {e}");
	HttpResponse::InternalServerError().body(e.to_string())
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates one word (random composition or simple blend) and returns it as JSON.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let input = match query.to_input(&data.config) {
		Ok(input) => input,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	match data.generator.generate(&input) {
		Ok(result) => HttpResponse::Ok().json(result),
		Err(e) => generation_error(e),
	}
}

#[get("/v1/tags")]
async fn get_tags(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(data.generator.store().distinct_tags())
}

/// HTTP GET endpoint `/v1/search`
///
/// Lists the entries of one morpheme class whose form contains `q`.
#[get("/v1/search")]
async fn get_search(data: web::Data<SharedData>, query: web::Query<SearchParams>) -> impl Responder {
	let store = data.generator.store();
	let q = query.q.as_deref().unwrap_or("");
	match query.kind.as_deref().map(str::to_lowercase).as_deref() {
		Some("prefix") => HttpResponse::Ok().json(store.search_prefixes(q)),
		Some("root") => HttpResponse::Ok().json(store.search_roots(q)),
		Some("suffix") => HttpResponse::Ok().json(store.search_suffixes(q)),
		_ => HttpResponse::BadRequest().body("Kind must be 'prefix', 'root' or 'suffix'"),
	}
}

/// HTTP GET endpoint `/v1/history`
///
/// Lists the newest entries, or returns the latest entry for `word`.
#[get("/v1/history")]
async fn get_history(data: web::Data<SharedData>, query: web::Query<HistoryParams>) -> impl Responder {
	let history = data.generator.history();
	if let Some(word) = &query.word {
		return match history.latest_by_word(word) {
			Some(entry) => HttpResponse::Ok().json(entry),
			None => HttpResponse::NotFound().body(format!("No history entry for '{word}'")),
		};
	}
	let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
	HttpResponse::Ok().json(history.recent(limit))
}

#[delete("/v1/history/{id}")]
async fn delete_history(data: web::Data<SharedData>, id: web::Path<u64>) -> impl Responder {
	let id = id.into_inner();
	if data.generator.history().delete(id) {
		HttpResponse::Ok().body(format!("History entry {id} deleted"))
	} else {
		HttpResponse::NotFound().body(format!("No history entry with id {id}"))
	}
}

#[get("/v1/favorites")]
async fn get_favorites(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(data.favorites.list())
}

#[get("/v1/favorites/{word}")]
async fn get_favorite(data: web::Data<SharedData>, word: web::Path<String>) -> impl Responder {
	match data.favorites.get(&word) {
		Some(entry) => HttpResponse::Ok().json(entry),
		None => HttpResponse::NotFound().body(format!("'{word}' is not a favorite")),
	}
}

/// HTTP POST endpoint `/v1/favorites`
///
/// Stores a result as a favorite. Without an explicit mode, results with a
/// provenance are labelled `random` and blends `simple`.
#[post("/v1/favorites")]
async fn post_favorite(data: web::Data<SharedData>, body: web::Json<FavoriteBody>) -> impl Responder {
	let mode = body.mode.unwrap_or(match body.result.provenance {
		Some(_) => HistoryMode::Random,
		None => HistoryMode::Simple,
	});
	HttpResponse::Ok().json(data.favorites.add(&body.result, mode))
}

#[delete("/v1/favorites/{word}")]
async fn delete_favorite(data: web::Data<SharedData>, word: web::Path<String>) -> impl Responder {
	if data.favorites.remove(&word) {
		HttpResponse::Ok().body(format!("'{word}' removed from favorites"))
	} else {
		HttpResponse::NotFound().body(format!("'{word}' is not a favorite"))
	}
}

/// HTTP POST endpoint `/v1/recompute`
///
/// Rebuilds a previous result under another definition mode or filter setting.
#[post("/v1/recompute")]
async fn post_recompute(data: web::Data<SharedData>, body: web::Json<RecomputeBody>) -> impl Responder {
	let mode = match parse_mode(body.mode.as_deref(), data.config.definition_mode) {
		Ok(mode) => mode,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};
	let use_filters = body.filters.unwrap_or(data.config.use_filters);
	HttpResponse::Ok().json(data.generator.recompute(&body.result, mode, use_filters))
}

/// HTTP PUT endpoint `/v1/reseed`
///
/// Re-parses the CSV seed files and clears the listing cache.
#[put("/v1/reseed")]
async fn put_reseed(data: web::Data<SharedData>) -> impl Responder {
	let store = data.generator.store();
	match store.reload(&data.config.data_dir) {
		Ok(()) => {
			let (prefixes, roots, suffixes) = store.counts();
			HttpResponse::Ok().body(format!("Lexicon reseeded: {prefixes} prefixes, {roots} roots, {suffixes} suffixes"))
		}
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to reseed lexicon: {e}")),
	}
}

fn load_config() -> Result<Config, GeneratorError> {
	match std::env::var(CONFIG_ENV) {
		Ok(path) => {
			info!("Loading configuration from {path}");
			Config::load_toml(path)
		}
		Err(_) => Ok(Config::default()),
	}
}

/// Main entry point for the server.
///
/// Loads the configuration (`NEO_GEN_CONFIG`, else defaults), the lexicon and
/// the blend lexicon from `data_dir`, then serves the API.
///
/// # Notes
/// - The lexicon is internally synchronized; handlers share it without an outer lock.
/// - The blend lexicon is read once at startup; `/v1/reseed` reloads the morpheme tables only.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = load_config().map_err(std::io::Error::other)?;
	match config.to_toml_string() {
		Ok(text) => debug!("Effective configuration:\n{text}"),
		Err(e) => warn!("Cannot render the configuration: {e}"),
	}
	let lexicon = Lexicon::new(&config.data_dir).map_err(std::io::Error::other)?;
	let history = Arc::new(InMemoryHistory::new(config.history_limit));
	let generator = Generator::new(lexicon, history).with_blender(load_blend_lexicon(&config.data_dir));

	let address = (config.bind_address.clone(), config.port);
	info!("Listening on {}:{}", address.0, address.1);
	let shared_data = web::Data::new(SharedData {
		config,
		generator,
		favorites: InMemoryFavorites::new(),
	});

	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_tags)
			.service(get_search)
			.service(get_history)
			.service(delete_history)
			.service(get_favorites)
			.service(get_favorite)
			.service(post_favorite)
			.service(delete_favorite)
			.service(post_recompute)
			.service(put_reseed)
	})
		.bind(address)?
		.run()
		.await
}
