use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::application::ChatModel;
use crate::domain::{ReplyError, Turn, FALLBACK_REPLY};

/// Produces one assistant reply for a conversation history plus a new message.
///
/// The public operations never fail: any error from the model (transport,
/// authentication, quota, malformed response, timeout, cancellation) is logged
/// and collapsed into [`FALLBACK_REPLY`]. Use [`Self::try_generate_reply`] when
/// the distinguished error matters.
///
/// Each call makes at most one request to the model. There are no retries and
/// no caching, and the history is forwarded in full and in order.
#[derive(Clone)]
pub struct ReplyGenerator {
    model: Arc<dyn ChatModel>,
    timeout: Option<Duration>,
}

impl ReplyGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            timeout: None,
        }
    }

    /// Bound each request to `timeout`. Without this the wait is unbounded.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub async fn generate_reply(&self, history: &[Turn], user_message: &str) -> String {
        Self::collapse(self.try_generate_reply(history, user_message, None).await)
    }

    /// Like [`Self::generate_reply`], but stops waiting once `cancel` fires.
    pub async fn generate_reply_cancellable(
        &self,
        history: &[Turn],
        user_message: &str,
        cancel: &CancellationToken,
    ) -> String {
        Self::collapse(self.try_generate_reply(history, user_message, Some(cancel)).await)
    }

    pub async fn try_generate_reply(
        &self,
        history: &[Turn],
        user_message: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<String, ReplyError> {
        debug!(
            "Generating reply with {} ({} prior turns)",
            self.model.model_name(),
            history.len()
        );
        let start_time = Instant::now();

        let send = self.model.send_message(history, user_message);
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, send)
                    .await
                    .unwrap_or_else(|_| Err(ReplyError::Timeout(limit))),
                None => send.await,
            }
        };

        let result = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ReplyError::Cancelled),
                    result = bounded => result,
                }
            }
            None => bounded.await,
        };

        debug!("Reply request finished in {:?}", start_time.elapsed());
        result
    }

    fn collapse(result: Result<String, ReplyError>) -> String {
        match result {
            Ok(text) => text,
            Err(e) => {
                error!("Reply generation failed: {e}");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::Role;

    enum Behavior {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct RecordingModel {
        behavior: Behavior,
        calls: Mutex<Vec<(Vec<Turn>, String)>>,
    }

    impl RecordingModel {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(Vec<Turn>, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn send_message(
            &self,
            history: &[Turn],
            message: &str,
        ) -> Result<String, ReplyError> {
            self.calls
                .lock()
                .unwrap()
                .push((history.to_vec(), message.to_string()));
            match self.behavior {
                Behavior::Reply(text) => Ok(text.to_string()),
                Behavior::Fail => Err(ReplyError::transport("connection reset")),
                Behavior::Hang => std::future::pending().await,
            }
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_success_returns_model_text_verbatim() {
        let model = RecordingModel::new(Behavior::Reply("  Spur starts at $29/month.\n"));
        let generator = ReplyGenerator::new(model.clone());

        let reply = generator.generate_reply(&[], "What is Spur?").await;

        assert_eq!(reply, "  Spur starts at $29/month.\n");
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.is_empty());
        assert_eq!(calls[0].1, "What is Spur?");
    }

    #[tokio::test]
    async fn test_failure_returns_exact_fallback() {
        let model = RecordingModel::new(Behavior::Fail);
        let generator = ReplyGenerator::new(model.clone());

        let reply = generator.generate_reply(&[Turn::user("Hi")], "Pricing?").await;

        assert_eq!(reply, FALLBACK_REPLY);
        assert_eq!(model.calls().len(), 1, "no retries");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_fallback_logs_underlying_error() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let generator = ReplyGenerator::new(RecordingModel::new(Behavior::Fail));
        let reply = generator.generate_reply(&[], "Pricing?").await;

        assert_eq!(reply, FALLBACK_REPLY);
        let output = logs.contents();
        assert!(output.contains("ERROR"), "missing error record: {output}");
        assert!(output.contains("Reply generation failed"));
        assert!(output.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_try_generate_exposes_error_kind() {
        let generator = ReplyGenerator::new(RecordingModel::new(Behavior::Fail));

        let err = generator
            .try_generate_reply(&[], "hello", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ReplyError::Transport(_)));
    }

    #[tokio::test]
    async fn test_history_is_forwarded_in_order() {
        let model = RecordingModel::new(Behavior::Reply("ok"));
        let generator = ReplyGenerator::new(model.clone());
        let history = vec![
            Turn::from_label("user", "Hi"),
            Turn::from_label("assistant", "Hello!"),
            Turn::from_label("user", "Do you support WhatsApp?"),
        ];

        generator.generate_reply(&history, "Pricing?").await;

        let (sent, message) = model.calls().remove(0);
        assert_eq!(sent, history);
        assert_eq!(sent[1].role(), Role::Model);
        assert_eq!(message, "Pricing?");
    }

    #[tokio::test]
    async fn test_identical_calls_are_not_cached() {
        let model = RecordingModel::new(Behavior::Reply("ok"));
        let generator = ReplyGenerator::new(model.clone());

        generator.generate_reply(&[], "same").await;
        generator.generate_reply(&[], "same").await;

        assert_eq!(model.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_yields_timeout_error_and_fallback() {
        let limit = Duration::from_millis(50);
        let generator =
            ReplyGenerator::new(RecordingModel::new(Behavior::Hang)).with_timeout(limit);

        let err = generator
            .try_generate_reply(&[], "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReplyError::Timeout(d) if d == limit));

        assert_eq!(generator.generate_reply(&[], "hello").await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_cancellation_stops_waiting() {
        let generator = ReplyGenerator::new(RecordingModel::new(Behavior::Hang));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = generator
            .try_generate_reply(&[], "hello", Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, ReplyError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_token_returns_fallback() {
        let model = RecordingModel::new(Behavior::Reply("never seen"));
        let generator = ReplyGenerator::new(model);
        let token = CancellationToken::new();
        token.cancel();

        let reply = generator
            .generate_reply_cancellable(&[], "hello", &token)
            .await;

        assert_eq!(reply, FALLBACK_REPLY);
    }
}
