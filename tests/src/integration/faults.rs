//! # Rogue Peers
//!
//! A registered peer that sends a tampered or unproven shuffle hop must stop
//! the receiving agent's run with `RoundAborted`.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use nt_04_operator_agent::domain::mix_batch;
    use nt_04_operator_agent::testing::{agent_config, trust_engine, ScriptedCollector};
    use nt_04_operator_agent::{
        decode, encode, AgentError, AgentIdentity, MemoryNetwork, MemoryTransport, Message,
        OperatorAgent, ShuffleBatch, Transport,
    };
    use shared_crypto::{GroupElement, MixKeyPair, SchnorrKeyPair};
    use tokio::sync::watch;
    use tokio::time::timeout;

    const FIRST: u16 = 9000;
    const ROGUE: u16 = 9001;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    /// Plays the last agent of a two-agent ring.
    struct Rogue {
        transport: MemoryTransport,
        mix: MixKeyPair,
    }

    impl Rogue {
        async fn register(&self) {
            let register = Message::AgentRegister {
                signing_key: SchnorrKeyPair::generate().public_key(),
                mix_key: self.mix.public(),
            };
            self.transport
                .send(addr(FIRST), &encode(&register).unwrap())
                .await
                .unwrap();
        }

        /// Wait for the honest agent's keys, proving it has seen ours.
        async fn await_peer(&self) {
            loop {
                let (bytes, from) = self.transport.recv().await.unwrap();
                if from == addr(FIRST)
                    && matches!(decode(&bytes), Ok(Message::AgentRegister { .. }))
                {
                    return;
                }
            }
        }

        async fn send_reverse(&self, batch: ShuffleBatch) {
            self.transport
                .send(addr(FIRST), &encode(&Message::ReverseShuffle(batch)).unwrap())
                .await
                .unwrap();
        }
    }

    async fn run_against(batch: impl FnOnce(&MixKeyPair) -> ShuffleBatch) -> AgentError {
        let network = MemoryNetwork::new();
        let members = vec![addr(FIRST), addr(ROGUE)];

        let mut agent = OperatorAgent::new(
            agent_config(&members, addr(FIRST), addr(8000)),
            AgentIdentity::generate(),
            trust_engine(),
            Arc::new(network.endpoint(addr(FIRST))),
        )
        .unwrap();
        agent.start();

        let (stop, stopped) = watch::channel(false);
        let collector =
            ScriptedCollector::new(network.endpoint(addr(8000)), members, vec![]).spawn(stopped);

        let rogue = Rogue {
            transport: network.endpoint(addr(ROGUE)),
            mix: MixKeyPair::generate(),
        };
        rogue.register().await;
        agent.announce().await.unwrap();
        rogue.await_peer().await;
        rogue.send_reverse(batch(&rogue.mix)).await;

        let result = timeout(Duration::from_secs(10), agent.run())
            .await
            .expect("agent did not abort");

        stop.send(true).unwrap();
        collector.await.unwrap();
        agent.shutdown().await;
        result.unwrap_err()
    }

    fn keys(n: usize) -> Vec<GroupElement> {
        (0..n).map(|_| GroupElement::random()).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tampered_hop_aborts_round() {
        let err = run_against(|mix| {
            let mut batch = mix_batch(keys(3), vec![vec![0u8; 8]; 3], mix).unwrap();
            batch.keys[0] = GroupElement::random();
            batch
        })
        .await;
        assert!(matches!(err, AgentError::RoundAborted(_)), "got {err}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unproven_hop_aborts_round() {
        let err = run_against(|_| ShuffleBatch::new(keys(2), vec![vec![0u8; 8]; 2])).await;
        assert!(matches!(err, AgentError::RoundAborted(_)), "got {err}");
        assert!(err.to_string().contains("Missing shuffle proof"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_proof_under_wrong_key_aborts_round() {
        let err = run_against(|_| {
            let impostor = MixKeyPair::generate();
            mix_batch(keys(4), vec![vec![0u8; 8]; 4], &impostor).unwrap()
        })
        .await;
        assert!(matches!(err, AgentError::RoundAborted(_)), "got {err}");
    }
}
