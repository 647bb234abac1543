use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// A decoded transaction payload.
///
/// The message type is the dispatch key for fee calculation; the route is
/// the dispatch key for the handler table and defaults to the message type.
pub trait Msg: Any + fmt::Debug + Send + Sync {
    /// Identifier classifying this message, e.g. `"transfer"`.
    fn msg_type(&self) -> &str;

    /// Route table key. Override when several message types share a handler.
    fn route(&self) -> &str {
        self.msg_type()
    }

    /// Number of coin movements the message performs.
    ///
    /// Transfer fee policies charge multi-send messages per movement.
    fn transfer_count(&self) -> usize {
        1
    }

    /// Returns a reference to self as `Any` so handlers can downcast.
    fn as_any(&self) -> &dyn Any;
}

/// Transaction identifier, the key fees are staged under.
///
/// Delivered transactions use the upper-case hex hash of their bytes;
/// block-level fee sources use a descriptive tag such as `"MATCH"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// Wraps an identifier as is.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier from a transaction hash.
    pub fn from_hash(hash: &[u8]) -> Self {
        Self(hex::encode_upper(hash))
    }

    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxId {
    fn from(id: &str) -> Self {
        TxId::new(id)
    }
}

impl From<String> for TxId {
    fn from(id: String) -> Self {
        TxId(id)
    }
}

/// A decoded transaction carrying one or more messages.
#[derive(Debug)]
pub struct Tx {
    id: TxId,
    msgs: Vec<Box<dyn Msg>>,
}

impl Tx {
    /// Creates a transaction.
    pub fn new(id: impl Into<TxId>, msgs: Vec<Box<dyn Msg>>) -> Self {
        Self {
            id: id.into(),
            msgs,
        }
    }

    /// Creates a transaction with a single message.
    pub fn single(id: impl Into<TxId>, msg: impl Msg) -> Self {
        Self::new(id, vec![Box::new(msg)])
    }

    /// Transaction identifier
    pub fn id(&self) -> &TxId {
        &self.id
    }

    /// Messages in execution order
    pub fn msgs(&self) -> &[Box<dyn Msg>] {
        &self.msgs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Ping;

    impl Msg for Ping {
        fn msg_type(&self) -> &str {
            "ping"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_route_defaults_to_msg_type() {
        let msg = Ping;
        assert_eq!(msg.route(), "ping");
        assert_eq!(msg.transfer_count(), 1);
        assert!(msg.as_any().downcast_ref::<Ping>().is_some());
    }

    #[test]
    fn test_tx_id_from_hash() {
        let id = TxId::from_hash(&[0xab, 0x01, 0xff]);
        assert_eq!(id.as_str(), "AB01FF");
        assert_eq!(id, TxId::from("AB01FF"));
    }

    #[test]
    fn test_tx_accessors() {
        let tx = Tx::single("tx1", Ping);
        assert_eq!(tx.id().as_str(), "tx1");
        assert_eq!(tx.msgs().len(), 1);
        assert_eq!(tx.msgs()[0].msg_type(), "ping");
    }
}
