//! Local emotion classification via ONNX Runtime.
//!
//! Loads an exported sequence-classification model from an artifact directory:
//!
//! - `model.onnx` (or `onnx/model.onnx`)
//! - `tokenizer.json`
//! - `config.json` (optional; `id2label` and `model_type` are checked)
//!
//! A warm-up inference at load time settles whether the graph takes
//! `token_type_ids` and rejects heads that do not score exactly six labels.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use serde::Deserialize;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use super::EmotionModel;
use crate::types::EmotionLabel;
use crate::{Result, SolaceError};

/// Default token budget, matching BERT-family position embeddings.
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Model families whose exported graphs take a `token_type_ids` input.
const TOKEN_TYPE_MODELS: &[&str] = &["bert", "albert", "electra", "deberta", "deberta-v2"];

/// Short input used to exercise the graph at load time.
const WARMUP_TEXT: &str = "hello";

/// The parts of a Hugging Face `config.json` the loader cares about.
#[derive(Debug, Default, Deserialize)]
struct ModelConfig {
    #[serde(default)]
    model_type: Option<String>,
    #[serde(default)]
    id2label: Option<BTreeMap<String, String>>,
}

impl ModelConfig {
    fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("config.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SolaceError::ModelUnavailable(format!("Failed to read {path:?}: {e}"))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            SolaceError::ModelUnavailable(format!("Failed to parse {path:?}: {e}"))
        })
    }

    /// Check the classifier head against the fixed label order.
    ///
    /// Generic `LABEL_<i>` names are accepted as-is.
    fn validate_labels(&self) -> Result<()> {
        let Some(ref id2label) = self.id2label else {
            return Ok(());
        };

        if id2label.len() != EmotionLabel::COUNT {
            return Err(SolaceError::ModelUnavailable(format!(
                "model has {} labels, expected {}",
                id2label.len(),
                EmotionLabel::COUNT
            )));
        }

        for (key, name) in id2label {
            let index: usize = key.parse().map_err(|_| {
                SolaceError::ModelUnavailable(format!("invalid id2label key: {key}"))
            })?;
            let expected = EmotionLabel::from_index(index).ok_or_else(|| {
                SolaceError::ModelUnavailable(format!("label index out of range: {index}"))
            })?;
            let generic = format!("LABEL_{index}");
            if !name.eq_ignore_ascii_case(expected.as_str()) && *name != generic {
                return Err(SolaceError::ModelUnavailable(format!(
                    "label {index} is {name:?}, expected {:?}",
                    expected.as_str()
                )));
            }
        }

        Ok(())
    }

    fn feeds_token_type_ids(&self) -> bool {
        self.model_type
            .as_deref()
            .is_some_and(|t| TOKEN_TYPE_MODELS.contains(&t))
    }
}

/// Emotion model backed by a pool of ONNX Runtime sessions.
pub struct OnnxEmotionModel {
    sessions: SessionPool<Session>,
    tokenizer: Tokenizer,
    name: String,
    feeds_token_type_ids: bool,
}

impl OnnxEmotionModel {
    /// Load the model from an artifact directory with the default session count.
    ///
    /// Any missing or incompatible artifact is a [`SolaceError::ModelUnavailable`].
    pub fn load(dir: &Path, max_length: usize) -> Result<Self> {
        Self::load_pooled(dir, max_length, default_session_count())
    }

    /// Load the model with `sessions` independent ONNX sessions.
    ///
    /// Each session holds its own copy of the weights; concurrent
    /// classifications run in parallel up to that count.
    pub fn load_pooled(dir: &Path, max_length: usize, sessions: usize) -> Result<Self> {
        if !dir.is_dir() {
            return Err(SolaceError::ModelUnavailable(format!(
                "Model directory not found: {dir:?}"
            )));
        }

        let model_path = resolve_model_path(dir)?;
        let tokenizer_path = dir.join("tokenizer.json");
        if !tokenizer_path.is_file() {
            return Err(SolaceError::ModelUnavailable(format!(
                "Tokenizer not found: {tokenizer_path:?}"
            )));
        }

        let config = ModelConfig::load(dir)?;
        config.validate_labels()?;

        let tokenizer = load_tokenizer(&tokenizer_path, max_length)?;
        let mut first = build_session(&model_path)?;

        // the graph decides the input layout and head width, not config.json
        let warmup = encode(&tokenizer, WARMUP_TEXT)
            .map_err(|e| SolaceError::ModelUnavailable(format!("warm-up encoding failed: {e}")))?;
        let feeds_token_type_ids = resolve_layout(config.feeds_token_type_ids(), |feeds| {
            run_session(&mut first, feeds, &warmup)
        })?;

        let count = sessions.max(1);
        let mut pool = Vec::with_capacity(count);
        pool.push(first);
        for _ in 1..count {
            pool.push(build_session(&model_path)?);
        }

        let name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();

        info!(
            model = %name,
            path = ?model_path,
            max_length,
            sessions = count,
            token_type_ids = feeds_token_type_ids,
            "loaded emotion model"
        );

        Ok(Self {
            sessions: SessionPool::new(pool),
            tokenizer,
            name,
            feeds_token_type_ids,
        })
    }

    /// Number of sessions that can run at once.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl EmotionModel for OnnxEmotionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn logits(&self, text: &str) -> Result<Vec<f32>> {
        let encoded = encode(&self.tokenizer, text)?;
        self.sessions
            .with(|session| run_session(session, self.feeds_token_type_ids, &encoded))?
    }
}

/// Sessions created when no count is configured: one per core, at most four.
pub fn default_session_count() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get().min(4))
}

/// Model inputs for one sequence.
struct Encoded {
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

fn encode(tokenizer: &Tokenizer, text: &str) -> Result<Encoded> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| SolaceError::Inference(format!("Tokenization failed: {}", e)))?;

    let widen = |values: &[u32]| values.iter().map(|&v| v as i64).collect::<Vec<i64>>();
    Ok(Encoded {
        input_ids: widen(encoding.get_ids()),
        attention_mask: widen(encoding.get_attention_mask()),
        token_type_ids: widen(encoding.get_type_ids()),
    })
}

/// Run a session on one encoded sequence and return its logits row.
fn run_session(
    session: &mut Session,
    feeds_token_type_ids: bool,
    encoded: &Encoded,
) -> Result<Vec<f32>> {
    use ort::value::TensorRef;

    let shape = [1_usize, encoded.input_ids.len()];

    let input_ids_tensor =
        TensorRef::from_array_view((shape, encoded.input_ids.as_slice())).map_err(|e| {
            SolaceError::Inference(format!("Failed to create input_ids tensor: {}", e))
        })?;
    let attention_mask_tensor =
        TensorRef::from_array_view((shape, encoded.attention_mask.as_slice())).map_err(|e| {
            SolaceError::Inference(format!("Failed to create attention_mask tensor: {}", e))
        })?;

    let outputs = if feeds_token_type_ids {
        let token_type_ids_tensor =
            TensorRef::from_array_view((shape, encoded.token_type_ids.as_slice())).map_err(
                |e| {
                    SolaceError::Inference(format!(
                        "Failed to create token_type_ids tensor: {}",
                        e
                    ))
                },
            )?;
        session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor,
            ])
            .map_err(|e| SolaceError::Inference(format!("ONNX inference failed: {}", e)))?
    } else {
        session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
            ])
            .map_err(|e| SolaceError::Inference(format!("ONNX inference failed: {}", e)))?
    };

    let logits = outputs
        .get("logits")
        .ok_or_else(|| SolaceError::Inference("No logits output found".to_string()))?;

    let (tensor_shape, logits_data) = logits
        .try_extract_tensor::<f32>()
        .map_err(|e| SolaceError::Inference(format!("Failed to extract logits: {}", e)))?;

    // batch of one: [1, num_labels]
    let num_labels = tensor_shape.last().copied().unwrap_or(0) as usize;
    Ok(logits_data[..num_labels.min(logits_data.len())].to_vec())
}

/// Find the input layout the graph accepts and check the classifier head.
///
/// `run` performs one warm-up inference with or without `token_type_ids`.
/// The preferred layout is tried first, then the other one.
fn resolve_layout(
    preferred: bool,
    mut run: impl FnMut(bool) -> Result<Vec<f32>>,
) -> Result<bool> {
    let (feeds, logits) = match run(preferred) {
        Ok(logits) => (preferred, logits),
        Err(first) => match run(!preferred) {
            Ok(logits) => (!preferred, logits),
            Err(_) => {
                return Err(SolaceError::ModelUnavailable(format!(
                    "warm-up inference failed: {first}"
                )));
            }
        },
    };

    if logits.len() != EmotionLabel::COUNT {
        return Err(SolaceError::ModelUnavailable(format!(
            "model outputs {} scores, expected {}",
            logits.len(),
            EmotionLabel::COUNT
        )));
    }
    Ok(feeds)
}

/// Fixed set of exclusively-borrowed resources.
///
/// A call takes the first idle slot, starting from a rotating offset, and
/// waits on that offset's slot only when every slot is busy.
struct SessionPool<T> {
    slots: Vec<Mutex<T>>,
    next: AtomicUsize,
}

impl<T> SessionPool<T> {
    /// An empty pool fails every call.
    fn new(items: Vec<T>) -> Self {
        Self {
            slots: items.into_iter().map(Mutex::new).collect(),
            next: AtomicUsize::new(0),
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        if self.slots.is_empty() {
            return Err(SolaceError::Inference("no sessions loaded".to_string()));
        }

        let start = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        for offset in 0..self.slots.len() {
            let slot = &self.slots[(start + offset) % self.slots.len()];
            if let Ok(mut guard) = slot.try_lock() {
                return Ok(f(&mut guard));
            }
        }

        let mut guard = self.slots[start]
            .lock()
            .map_err(|e| SolaceError::Inference(format!("Session lock poisoned: {}", e)))?;
        Ok(f(&mut guard))
    }
}

fn resolve_model_path(dir: &Path) -> Result<PathBuf> {
    [dir.join("model.onnx"), dir.join("onnx").join("model.onnx")]
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| {
            SolaceError::ModelUnavailable(format!("No model.onnx found under {dir:?}"))
        })
}

fn load_tokenizer(path: &Path, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
        SolaceError::ModelUnavailable(format!("Failed to load tokenizer from {path:?}: {e}"))
    })?;

    tokenizer.with_padding(None);
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| {
            SolaceError::ModelUnavailable(format!("Failed to configure truncation: {e}"))
        })?;

    Ok(tokenizer)
}

fn build_session(model_path: &Path) -> Result<Session> {
    Session::builder()
        .map_err(|e| {
            SolaceError::ModelUnavailable(format!("Failed to create session builder: {}", e))
        })?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| {
            SolaceError::ModelUnavailable(format!("Failed to set optimization level: {}", e))
        })?
        .commit_from_file(model_path)
        .map_err(|e| SolaceError::ModelUnavailable(format!("Failed to load ONNX model: {}", e)))
}
