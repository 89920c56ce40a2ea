//! Protocol module - JSON message types for the controller adapter
//!
//! Line-delimited JSON. All messages have: type, seq (sequence number), ts (timestamp in ms)

use serde::{Deserialize, Serialize};

use crate::core::{CardFace, SessionSnapshot};
use crate::types::{Difficulty, SessionEvent, SessionPhase};

use arrayvec::ArrayVec;

/// Upper bound on actions in one command message
pub const MAX_ACTIONS: usize = 32;

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    Hello,
}

impl Default for HelloType {
    fn default() -> Self {
        Self::Hello
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "command")]
    Command,
}

impl Default for CommandType {
    fn default() -> Self {
        Self::Command
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlType {
    #[serde(rename = "control")]
    Control,
}

impl Default for ControlType {
    fn default() -> Self {
        Self::Control
    }
}

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default)]
    pub stream_observations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "controller")]
    Controller,
    #[serde(rename = "observer")]
    Observer,
}

/// Command message (controller only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub actions: ActionList,
}

/// One requested action, as it appears on the wire
///
/// `{"action":"flip","index":3}`, `{"action":"togglePause"}`, `{"action":"reset"}`,
/// `{"action":"start","difficulty":"hard"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionSpec {
    Flip { index: usize },
    TogglePause,
    Reset,
    Start { difficulty: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionList(pub ArrayVec<ActionSpec, MAX_ACTIONS>);

impl<'de> Deserialize<'de> for ActionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = ActionList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of action objects")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<ActionSpec, MAX_ACTIONS>::new();
                while let Some(a) = seq.next_element::<ActionSpec>()? {
                    out.try_push(a)
                        .map_err(|_| serde::de::Error::custom("too many actions"))?;
                }
                Ok(ActionList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

impl Serialize for ActionList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for a in self.0.iter() {
            seq.serialize_element(a)?;
        }
        seq.end()
    }
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Claim,
    Release,
}

impl<'de> Deserialize<'de> for ControlAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("claim") {
            Ok(Self::Claim)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(Self::Release)
        } else {
            Err(serde::de::Error::custom("invalid control action"))
        }
    }
}

impl Serialize for ControlAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ControlAction::Claim => serializer.serialize_str("claim"),
            ControlAction::Release => serializer.serialize_str("release"),
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "controller_active")]
    ControllerActive,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "backpressure")]
    Backpressure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub actions: Vec<String>,
    pub difficulties: Vec<String>,
}

/// Acknowledgment for command receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Session observation (snapshot plus the events since the previous one)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub phase: PhaseLower,
    pub playable: bool,
    pub paused: bool,
    pub finished: bool,
    pub generation: u32,
    pub difficulty: DifficultyLower,
    pub countdown: u8,
    pub time_left: u32,
    pub score: u32,
    pub combo: u32,
    pub matched: u32,
    pub cards: Vec<CardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<u32>,
    pub events: Vec<EventView>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseLower {
    #[serde(rename = "countdown")]
    Countdown,
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "paused")]
    Paused,
    #[serde(rename = "won")]
    Won,
    #[serde(rename = "lost")]
    Lost,
}

impl From<SessionPhase> for PhaseLower {
    fn from(value: SessionPhase) -> Self {
        match value {
            SessionPhase::Countdown { .. } => Self::Countdown,
            SessionPhase::Playing => Self::Playing,
            SessionPhase::Paused => Self::Paused,
            SessionPhase::Won => Self::Won,
            SessionPhase::Lost => Self::Lost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyLower {
    #[serde(rename = "easy")]
    Easy,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "hard")]
    Hard,
}

impl From<Difficulty> for DifficultyLower {
    fn from(value: Difficulty) -> Self {
        match value {
            Difficulty::Easy => Self::Easy,
            Difficulty::Normal => Self::Normal,
            Difficulty::Hard => Self::Hard,
        }
    }
}

impl From<DifficultyLower> for Difficulty {
    fn from(value: DifficultyLower) -> Self {
        match value {
            DifficultyLower::Easy => Difficulty::Easy,
            DifficultyLower::Normal => Difficulty::Normal,
            DifficultyLower::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardState {
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "revealed")]
    Revealed,
    #[serde(rename = "matched")]
    Matched,
}

/// One card as observers see it; the symbol is only present while face up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub state: CardState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl From<CardFace> for CardView {
    fn from(value: CardFace) -> Self {
        let state = match value {
            CardFace::Hidden => CardState::Hidden,
            CardFace::Revealed(_) => CardState::Revealed,
            CardFace::Matched(_) => CardState::Matched,
        };
        Self {
            state,
            symbol: value.symbol().map(|s| s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EventView {
    CountdownTick { remaining: u8 },
    Started { time_limit: u32 },
    Revealed { index: usize },
    Matched {
        first: usize,
        second: usize,
        symbol: String,
        points: u32,
        combo: u32,
    },
    Mismatched { first: usize, second: usize },
    Hidden { index: usize },
    Paused,
    Resumed,
    TimeTick { time_left: u32 },
    Won { score: u32 },
    Lost { score: u32 },
    Reset { generation: u32 },
}

impl From<SessionEvent> for EventView {
    fn from(value: SessionEvent) -> Self {
        match value {
            SessionEvent::CountdownTick { remaining } => Self::CountdownTick { remaining },
            SessionEvent::Started { time_limit } => Self::Started { time_limit },
            SessionEvent::Revealed { index } => Self::Revealed { index },
            SessionEvent::Matched {
                first,
                second,
                symbol,
                points,
                combo,
            } => Self::Matched {
                first,
                second,
                symbol: symbol.to_string(),
                points,
                combo,
            },
            SessionEvent::Mismatched { first, second } => Self::Mismatched { first, second },
            SessionEvent::Hidden { index } => Self::Hidden { index },
            SessionEvent::Paused => Self::Paused,
            SessionEvent::Resumed => Self::Resumed,
            SessionEvent::TimeTick { time_left } => Self::TimeTick { time_left },
            SessionEvent::Won { score } => Self::Won { score },
            SessionEvent::Lost { score } => Self::Lost { score },
            SessionEvent::Reset { generation } => Self::Reset { generation },
        }
    }
}

/// Deterministic state hash serialized as lowercase hex (16 digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl StateHash {
    /// FNV-1a over the snapshot; stable across Rust versions, unlike `DefaultHasher`
    pub fn of(snapshot: &SessionSnapshot) -> Self {
        use std::hash::{Hash, Hasher};

        let mut hasher = Fnv1aHasher::new();
        snapshot.hash(&mut hasher);
        StateHash(hasher.finish())
    }
}

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            buf[15 - i] = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        let s = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // An unknown type is reported to the client, not treated as a parse failure.
            #[derive(Debug, Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            let msg_type = envelope.msg_type.unwrap_or("unknown");
            if !matches!(msg_type, "hello" | "command" | "control") {
                return Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: envelope.seq.unwrap_or(0),
                }));
            }
            Err(e)
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities {
            stream_observations: true,
        },
    }
}

/// Create a command message
pub fn create_command(seq: u64, actions: impl IntoIterator<Item = ActionSpec>) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        actions: ActionList(actions.into_iter().take(MAX_ACTIONS).collect()),
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: "card-match".to_string(),
        capabilities: ServerCapabilities {
            actions: ["flip", "togglePause", "reset", "start"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            difficulties: Difficulty::ALL
                .iter()
                .map(|d| d.as_str().to_string())
                .collect(),
        },
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build an observation from a snapshot and the events drained since the last one
pub fn build_observation(
    seq: u64,
    snapshot: &SessionSnapshot,
    events: &[SessionEvent],
) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        phase: snapshot.phase.into(),
        playable: snapshot.playable(),
        paused: snapshot.phase == SessionPhase::Paused,
        finished: snapshot.phase.is_terminal(),
        generation: snapshot.generation,
        difficulty: snapshot.difficulty.into(),
        countdown: snapshot.countdown,
        time_left: snapshot.time_left,
        score: snapshot.score,
        combo: snapshot.combo,
        matched: snapshot.matched,
        cards: snapshot.cards.iter().copied().map(CardView::from).collect(),
        final_score: snapshot.final_score,
        events: events.iter().copied().map(EventView::from).collect(),
        state_hash: StateHash::of(snapshot),
    }
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Session, SessionConfig};
    use crate::types::SymbolId;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"test-bot","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}"#;
        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.msg_type, HelloType::Hello);
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "test-bot");
                assert_eq!(msg.protocol_version, "1.0.0");
                assert!(msg.requested.stream_observations);
            }
            _ => panic!("Expected Hello message"),
        }
    }

    #[test]
    fn test_parse_command_actions() {
        let json = r#"{"type":"command","seq":2,"ts":1,"actions":[{"action":"flip","index":4},{"action":"togglePause"},{"action":"start","difficulty":"hard"}]}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Command(msg) => {
                let a = msg.actions.0;
                assert_eq!(a.len(), 3);
                assert_eq!(a[0], ActionSpec::Flip { index: 4 });
                assert_eq!(a[1], ActionSpec::TogglePause);
                assert_eq!(
                    a[2],
                    ActionSpec::Start {
                        difficulty: "hard".to_string()
                    }
                );
            }
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_parse_command_rejects_unknown_action() {
        let json = r#"{"type":"command","seq":2,"ts":1,"actions":[{"action":"shuffle"}]}"#;
        assert!(parse_message(json).is_err());
    }

    #[test]
    fn test_parse_command_rejects_too_many_actions() {
        let actions = vec![r#"{"action":"reset"}"#; MAX_ACTIONS + 1].join(",");
        let json = format!(r#"{{"type":"command","seq":2,"ts":1,"actions":[{}]}}"#, actions);
        assert!(parse_message(&json).is_err());
    }

    #[test]
    fn test_parse_control() {
        let json = r#"{"type":"control","seq":3,"ts":1,"action":"Release"}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Control(msg) => assert_eq!(msg.action, ControlAction::Release),
            _ => panic!("Expected Control message"),
        }
    }

    #[test]
    fn test_parse_unknown_type_keeps_seq() {
        let json = r#"{"type":"telemetry","seq":9}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Unknown(u) => assert_eq!(u.seq, 9),
            _ => panic!("Expected Unknown message"),
        }
    }

    #[test]
    fn test_error_code_serialization() {
        let err = create_error(5, ErrorCode::NotController, "nope");
        let v: serde_json::Value = serde_json::to_value(&err).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["code"], "not_controller");
        assert_eq!(v["seq"], 5);
    }

    #[test]
    fn test_command_round_trips_through_parser() {
        let cmd = create_command(7, [ActionSpec::Flip { index: 1 }, ActionSpec::Reset]);
        let line = serde_json::to_string(&cmd).unwrap();
        match parse_message(&line).unwrap() {
            ParsedMessage::Command(msg) => {
                assert_eq!(msg.seq, 7);
                assert_eq!(msg.actions, cmd.actions);
            }
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_observation_hides_face_down_symbols() {
        let config = SessionConfig::reference()
            .with_symbols(vec![SymbolId(1), SymbolId(2)])
            .with_seed(3);
        let mut session = Session::new(config).unwrap();
        for _ in 0..3 {
            session.tick();
        }
        session.flip(0);
        let events = session.take_events();

        let obs = build_observation(1, &session.snapshot(), &events);
        let v = serde_json::to_value(&obs).unwrap();

        assert_eq!(v["type"], "observation");
        assert_eq!(v["phase"], "playing");
        assert_eq!(v["cards"][0]["state"], "revealed");
        assert!(v["cards"][0]["symbol"].as_str().unwrap().starts_with("card"));
        assert_eq!(v["cards"][1]["state"], "hidden");
        assert!(v["cards"][1].get("symbol").is_none());
        assert!(v.get("final_score").is_none());
        assert_eq!(v["events"].as_array().unwrap().last().unwrap()["event"], "revealed");
        assert_eq!(v["state_hash"].as_str().unwrap().len(), 16);
    }

    #[test]
    fn test_state_hash_tracks_snapshot() {
        let mut session = Session::new(SessionConfig::reference()).unwrap();
        let h1 = StateHash::of(&session.snapshot());
        assert_eq!(h1, StateHash::of(&session.snapshot()));

        session.tick();
        assert_ne!(h1, StateHash::of(&session.snapshot()));
    }
}
