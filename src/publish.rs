//! Publish sinks for velocity commands
//!
//! Every sink serializes a command as a single JSON object tagged with the
//! topic name:
//!
//! ```text
//! {"topic":"cmd_vel","linear":{"x":0.6,"y":0.0,"z":0.0},"angular":{"x":0.0,"y":0.0,"z":0.0}}
//! ```

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::net::UdpSocket;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::command::{Twist, Vector3};

/// Logical name of the velocity command topic
pub const TOPIC: &str = "cmd_vel";

/// Accepts velocity commands for delivery to subscribers
///
/// Delivery is the sink's concern; callers only report failures.
pub trait Publisher {
    /// Publishes a single command.
    fn publish(&mut self, msg: &Twist) -> io::Result<()>;
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&mut self, msg: &Twist) -> io::Result<()> {
        (**self).publish(msg)
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    topic: &'a str,
    linear: &'a Vector3,
    angular: &'a Vector3,
}

/// Encodes a command in the wire format shared by all sinks.
pub fn encode(topic: &str, msg: &Twist) -> io::Result<Vec<u8>> {
    let envelope = Envelope{
        topic,
        linear: &msg.linear,
        angular: &msg.angular,
    };

    serde_json::to_vec(&envelope).map_err(io::Error::from)
}

/// Writes newline-delimited JSON messages to a stream
pub struct JsonLines<W> {
    topic: String,
    out: W,
}

impl<W: Write> JsonLines<W> {
    /// Creates a sink writing messages for `topic` to `out`.
    pub fn new(topic: &str, out: W) -> JsonLines<W> {
        JsonLines{
            topic: topic.to_owned(),
            out,
        }
    }

    /// Consumes the sink, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonLines<File> {
    /// Creates a sink appending to the file at `path`.
    pub fn append<P: AsRef<Path>>(topic: &str, path: P) -> io::Result<JsonLines<File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(JsonLines::new(topic, file))
    }
}

impl<W: Write> Publisher for JsonLines<W> {
    fn publish(&mut self, msg: &Twist) -> io::Result<()> {
        let mut line = encode(&self.topic, msg)?;
        line.push(b'\n');

        self.out.write_all(&line)?;
        self.out.flush()
    }
}

/// Sends each message as one UDP datagram to a bridge address
pub struct UdpSink {
    topic: String,
    socket: UdpSocket,
}

impl UdpSink {
    /// Binds an ephemeral local socket and connects it to `addr`.
    pub fn connect(topic: &str, addr: &str) -> io::Result<UdpSink> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(addr)?;

        Ok(UdpSink{
            topic: topic.to_owned(),
            socket,
        })
    }
}

impl Publisher for UdpSink {
    fn publish(&mut self, msg: &Twist) -> io::Result<()> {
        let buf = encode(&self.topic, msg)?;
        self.socket.send(&buf)?;
        Ok(())
    }
}

/// Destination of published commands, as given on the command line
///
/// * `-` or `stderr`: newline-delimited JSON on standard error
/// * `udp://HOST:PORT`: one datagram per message
/// * anything else: path of a file to append newline-delimited JSON to
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SinkTarget {
    /// Standard error
    Stderr,
    /// UDP bridge address
    Udp(String),
    /// File path
    File(PathBuf),
}

impl SinkTarget {
    /// Opens the sink for `topic`.
    pub fn open(&self, topic: &str) -> io::Result<Box<dyn Publisher>> {
        let sink: Box<dyn Publisher> = match *self {
            SinkTarget::Stderr => Box::new(JsonLines::new(topic, io::stderr())),
            SinkTarget::Udp(ref addr) => Box::new(UdpSink::connect(topic, addr)?),
            SinkTarget::File(ref path) => Box::new(JsonLines::append(topic, path)?),
        };

        Ok(sink)
    }
}

impl FromStr for SinkTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<SinkTarget, String> {
        if s.is_empty() {
            return Err("sink must not be empty".to_owned());
        }

        if s == "-" || s == "stderr" {
            return Ok(SinkTarget::Stderr);
        }

        if let Some(addr) = s.strip_prefix("udp://") {
            if addr.rsplit_once(':').map_or(true, |(host, port)|
                    host.is_empty() || port.parse::<u16>().is_err()) {
                return Err(format!("expected udp://HOST:PORT, found {:?}", s));
            }

            return Ok(SinkTarget::Udp(addr.to_owned()));
        }

        Ok(SinkTarget::File(PathBuf::from(s)))
    }
}

impl fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SinkTarget::Stderr => f.write_str("stderr"),
            SinkTarget::Udp(ref addr) => write!(f, "udp://{}", addr),
            SinkTarget::File(ref path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Read;
    use std::net::UdpSocket;
    use std::path::PathBuf;
    use std::time::Duration;

    use serde_json::Value;

    use crate::command::Twist;
    use super::{JsonLines, Publisher, SinkTarget, UdpSink, TOPIC};

    #[test]
    fn test_json_lines() {
        let mut sink = JsonLines::new(TOPIC, Vec::new());

        sink.publish(&Twist::planar(0.6, 0.0)).unwrap();
        sink.publish(&Twist::zero()).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["topic"], "cmd_vel");
        assert_eq!(first["linear"]["x"], 0.6);
        assert_eq!(first["angular"]["z"], 0.0);

        let second: Value = serde_json::from_str(lines[1]).unwrap();
        let twist: Twist = serde_json::from_value(second).unwrap();
        assert!(twist.is_zero());
    }

    #[test]
    fn test_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmd_vel.jsonl");

        let target = SinkTarget::File(path.clone());
        let mut sink = target.open(TOPIC).unwrap();

        sink.publish(&Twist::planar(0.6, 0.6)).unwrap();
        sink.publish(&Twist::planar(0.6, -0.6)).unwrap();
        drop(sink);

        let mut contents = String::new();
        std::fs::File::open(&path).unwrap().read_to_string(&mut contents).unwrap();

        assert_eq!(contents.lines().count(), 2);
        assert!(contents.ends_with('\n'));
    }

    #[test]
    fn test_udp_sink() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

        let addr = receiver.local_addr().unwrap().to_string();
        let mut sink = UdpSink::connect(TOPIC, &addr).unwrap();

        sink.publish(&Twist::planar(-0.6, 0.0)).unwrap();

        let mut buf = [0; 512];
        let n = receiver.recv(&mut buf).unwrap();
        let msg: Value = serde_json::from_slice(&buf[..n]).unwrap();

        assert_eq!(msg["topic"], "cmd_vel");
        assert_eq!(msg["linear"]["x"], -0.6);
    }

    #[test]
    fn test_sink_target_parse() {
        assert_eq!("-".parse::<SinkTarget>(), Ok(SinkTarget::Stderr));
        assert_eq!("stderr".parse::<SinkTarget>(), Ok(SinkTarget::Stderr));
        assert_eq!("udp://127.0.0.1:7400".parse::<SinkTarget>(),
            Ok(SinkTarget::Udp("127.0.0.1:7400".to_owned())));
        assert_eq!("/tmp/cmd_vel.jsonl".parse::<SinkTarget>(),
            Ok(SinkTarget::File(PathBuf::from("/tmp/cmd_vel.jsonl"))));

        assert!("".parse::<SinkTarget>().is_err());
        assert!("udp://localhost".parse::<SinkTarget>().is_err());
        assert!("udp://:7400".parse::<SinkTarget>().is_err());
        assert!("udp://host:port".parse::<SinkTarget>().is_err());
    }

    #[test]
    fn test_sink_target_display() {
        assert_eq!(SinkTarget::Udp("robot:7400".to_owned()).to_string(), "udp://robot:7400");
        assert_eq!(SinkTarget::Stderr.to_string(), "stderr");
    }
}
