//! In-memory doubles for the identity provider, studio API and OTP source,
//! plus a loopback HTTP server for exercising the real clients

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{SunoError, SunoResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::clerk::IdentityProvider;
use crate::models::{
    Clip, FirstFactor, GenerateRequest, SessionToken, SignInAttempt, SignInCompletion, SongStatus,
};
use crate::otp::OtpProvider;
use crate::session::Session;
use crate::studio::StudioApi;

/// Identity provider accepting a fixed code per phone number
#[derive(Default)]
pub struct FakeIdentity {
    codes: HashMap<String, String>,
    without_session: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(mut self, phone: &str, code: &str) -> Self {
        self.codes.insert(phone.to_string(), code.to_string());
        self
    }

    pub fn without_session(mut self, phone: &str) -> Self {
        self.without_session.insert(phone.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn create_sign_in(&self, phone: &str) -> SunoResult<SignInAttempt> {
        self.record(format!("sign_in:{}", phone));
        Ok(SignInAttempt {
            id: format!("sia_{}", phone),
            supported_first_factors: vec![FirstFactor {
                strategy: Some("phone_code".to_string()),
                phone_number_id: Some(format!("idn_{}", phone)),
            }],
            phone: phone.to_string(),
            client_token: Some(format!("client_{}", phone)),
        })
    }

    async fn prepare_phone_code(&self, attempt: &SignInAttempt) -> SunoResult<()> {
        self.record(format!("prepare:{}", attempt.phone));
        Ok(())
    }

    async fn attempt_phone_code(
        &self,
        attempt: &SignInAttempt,
        code: &str,
    ) -> SunoResult<SignInCompletion> {
        self.record(format!("attempt:{}:{}", attempt.phone, code));

        if self.codes.get(&attempt.phone).map(String::as_str) != Some(code) {
            return Err(SunoError::Authentication {
                phone: attempt.phone.clone(),
                reason: "OTP verification returned HTTP 422".to_string(),
            });
        }

        let created_session_id = if self.without_session.contains(&attempt.phone) {
            None
        } else {
            Some(format!("sess_{}", attempt.phone))
        };

        Ok(SignInCompletion {
            status: Some("complete".to_string()),
            created_session_id,
        })
    }

    async fn session_token(&self, session: &Session) -> SunoResult<SessionToken> {
        self.record(format!("token:{}", session.session_id()));
        let issued = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("token:"))
            .count();
        Ok(SessionToken {
            jwt: format!("jwt-{}-{}", session.session_id(), issued),
        })
    }
}

/// OTP source returning canned codes
#[derive(Default)]
pub struct CannedOtp {
    codes: HashMap<String, String>,
}

impl CannedOtp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(mut self, phone: &str, code: &str) -> Self {
        self.codes.insert(phone.to_string(), code.to_string());
        self
    }
}

#[async_trait]
impl OtpProvider for CannedOtp {
    async fn otp_for(&self, phone: &str) -> SunoResult<String> {
        Ok(self.codes.get(phone).cloned().unwrap_or_default())
    }
}

/// Studio API with scripted statuses per song id
///
/// Each feed call consumes the next scripted status of every requested id;
/// the last status repeats once the script runs out.
#[derive(Default)]
pub struct FakeStudio {
    song_ids: Vec<String>,
    no_credits: HashSet<String>,
    scripts: Mutex<HashMap<String, VecDeque<SongStatus>>>,
    broken_downloads: HashSet<String>,
    without_audio_url: HashSet<String>,
    missing_from_feed: HashSet<String>,
    generate_calls: Mutex<Vec<String>>,
    feed_calls: Mutex<Vec<Vec<String>>>,
    downloads: Mutex<Vec<String>>,
}

impl FakeStudio {
    pub fn new(song_ids: &[&str]) -> Self {
        Self {
            song_ids: song_ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn out_of_credits(mut self, phone: &str) -> Self {
        self.no_credits.insert(phone.to_string());
        self
    }

    pub fn script(self, song_id: &str, statuses: &[&str]) -> Self {
        self.scripts.lock().unwrap().insert(
            song_id.to_string(),
            statuses.iter().map(|s| SongStatus::from(*s)).collect(),
        );
        self
    }

    pub fn broken_download(mut self, song_id: &str) -> Self {
        self.broken_downloads.insert(song_id.to_string());
        self
    }

    pub fn without_audio_url(mut self, song_id: &str) -> Self {
        self.without_audio_url.insert(song_id.to_string());
        self
    }

    pub fn missing_from_feed(mut self, song_id: &str) -> Self {
        self.missing_from_feed.insert(song_id.to_string());
        self
    }

    pub fn generate_calls(&self) -> Vec<String> {
        self.generate_calls.lock().unwrap().clone()
    }

    pub fn feed_calls(&self) -> Vec<Vec<String>> {
        self.feed_calls.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    fn audio_url(&self, song_id: &str) -> Option<String> {
        if self.without_audio_url.contains(song_id) {
            None
        } else {
            Some(format!("https://cdn.test/{}.mp3", song_id))
        }
    }
}

#[async_trait]
impl StudioApi for FakeStudio {
    async fn generate(
        &self,
        session: &Session,
        _request: &GenerateRequest,
    ) -> SunoResult<Vec<Clip>> {
        self.generate_calls
            .lock()
            .unwrap()
            .push(session.phone().to_string());

        if self.no_credits.contains(session.phone()) {
            return Err(SunoError::InsufficientCredits {
                phone: session.phone().to_string(),
            });
        }

        Ok(self
            .song_ids
            .iter()
            .map(|id| Clip {
                id: id.clone(),
                status: SongStatus::Queued,
                audio_url: None,
                title: None,
                error_message: None,
            })
            .collect())
    }

    async fn feed(&self, _session: &Session, song_ids: &[String]) -> SunoResult<Vec<Clip>> {
        self.feed_calls.lock().unwrap().push(song_ids.to_vec());

        let mut scripts = self.scripts.lock().unwrap();
        let clips = song_ids
            .iter()
            .filter(|id| !self.missing_from_feed.contains(*id))
            .map(|id| {
                let status = match scripts.get_mut(id) {
                    Some(script) if script.len() > 1 => script.pop_front().unwrap_or_default(),
                    Some(script) => script.front().cloned().unwrap_or_default(),
                    None => SongStatus::Complete,
                };
                let audio_url = match status {
                    SongStatus::Complete | SongStatus::Streaming => self.audio_url(id),
                    _ => None,
                };
                Clip {
                    id: id.clone(),
                    status,
                    audio_url,
                    title: None,
                    error_message: None,
                }
            })
            .collect();

        Ok(clips)
    }

    async fn download_audio(&self, audio_url: &str, destination: &Path) -> SunoResult<u64> {
        self.downloads.lock().unwrap().push(audio_url.to_string());

        if self
            .broken_downloads
            .iter()
            .any(|id| audio_url.contains(id.as_str()))
        {
            return Err(SunoError::Network("connection reset".to_string()));
        }

        let payload = format!("ID3 fake audio from {}", audio_url);
        tokio::fs::write(destination, payload.as_bytes()).await?;
        Ok(payload.len() as u64)
    }
}

/// Response served by [`CannedHttp`]
#[derive(Debug, Clone)]
pub struct CannedResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    content_length: Option<usize>,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.as_bytes().to_vec(),
            content_length: None,
        }
    }

    pub fn bytes(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "audio/mpeg".to_string())],
            body: body.to_vec(),
            content_length: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Announce more bytes than are sent, so the connection drops mid-body
    pub fn truncated(mut self, announced: usize) -> Self {
        self.content_length = Some(announced);
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} Canned\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            self.content_length.unwrap_or(self.body.len())
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Loopback HTTP server answering one connection per canned response
pub struct CannedHttp {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedHttp {
    pub async fn serve(responses: Vec<CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        tokio::spawn(async move {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                seen.lock().unwrap().push(request);
                let _ = stream.write_all(&response.to_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { base_url, requests }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Raw requests received so far, lowercased for header matching
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&buf).to_lowercase(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let body_len = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + body_len {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    String::from_utf8_lossy(&buf).to_lowercase()
}
