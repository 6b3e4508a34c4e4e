//! Simulated AI reply generation.
//!
//! [`ReplySource`] is the seam where a real LLM backend would plug in; this
//! repository ships only [`CannedReplies`], which picks one of a fixed set of
//! response templates at random.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed message for the default session created at startup.
pub const WELCOME: &str = "Welcome to your personalized AI tutor! I'm here to help you learn and grow. Upload documents, ask questions, or let me know what you'd like to study today. I can analyze your materials and provide tailored explanations based on your job role and learning goals.";

/// Seed message for the default session created by a full history reset.
pub const WELCOME_RESET: &str = "Welcome to your personalized AI tutor! I'm here to help you learn and grow. Upload documents, ask questions, or let me know what you'd like to study today.";

/// Seed message for sessions created by the "new session" action.
pub const NEW_SESSION: &str = "New session started! How can I help you learn today?";

/// Seed message left behind when a session is cleared.
pub const SESSION_CLEARED: &str = "Session cleared! How can I help you learn today?";

/// Response templates; `{topic}` is replaced with the user's message text.
const RESPONSE_TEMPLATES: [&str; 4] = [
    "Great question! Based on your uploaded documents and our conversation, here's what I can tell you about \"{topic}\". This relates to your professional development and I can break it down into key concepts that align with your role.",
    "I understand you're exploring \"{topic}\". Let me analyze this in the context of your career goals and provide some structured insights. Would you like me to create a learning path for this topic?",
    "Excellent! \"{topic}\" is an important topic. I can see from your knowledge base that this connects to several documents you've uploaded. Let me provide a comprehensive explanation tailored to your background.",
    "That's a thoughtful question about \"{topic}\". I'll draw from your uploaded materials and industry best practices to give you a detailed response that's relevant to your professional context.",
];

/// Renders the analysis summary appended for each uploaded document.
pub fn document_analysis(file_name: &str) -> String {
    format!(
        "\u{1F4C4} Document uploaded: \"{file_name}\". I've analyzed the content and added it to your knowledge base. The insights from this document are now available for our conversation."
    )
}

/// Produces the AI side of the conversation.
///
/// Implementations must be cheap to call concurrently; the store invokes this
/// from one spawned task per in-flight reply.
#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Returns the reply content for the given user prompt.
    async fn reply(&self, prompt: &str) -> String;
}

/// Canned replies: a uniformly random pick from a fixed template set.
pub struct CannedReplies {
    rng: Mutex<StdRng>,
}

impl CannedReplies {
    /// Creates a reply bank seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a reply bank with a fixed seed, for deterministic selection.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for CannedReplies {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplySource for CannedReplies {
    async fn reply(&self, prompt: &str) -> String {
        let index = self.rng.lock().gen_range(0..RESPONSE_TEMPLATES.len());
        RESPONSE_TEMPLATES[index].replace("{topic}", prompt)
    }
}
