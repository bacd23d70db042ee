//! # Three-Agent Ring
//!
//! Subjects register through the scripted collector, then every agent runs
//! full maintenance cycles. All agents must finish with the same list, and
//! every subject must be found under `secret · g`.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use futures::future::join_all;
    use nt_04_operator_agent::testing::{
        agent_config, trust_engine, ScriptedCollector, ScriptedSubject, ABNORMAL_FEATURES,
        NORMAL_FEATURES,
    };
    use nt_04_operator_agent::{AgentIdentity, MemoryNetwork, OperatorAgent, RoundStatus};
    use shared_types::ReputationEntry;
    use tokio::sync::watch;

    const COLLECTOR_PORT: u16 = 8000;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    struct Ring {
        agents: Vec<OperatorAgent>,
        stop: watch::Sender<bool>,
        collector: tokio::task::JoinHandle<()>,
    }

    impl Ring {
        async fn start(size: u16, cycles: u32, subjects: Vec<ScriptedSubject>) -> Self {
            let network = MemoryNetwork::new();
            let members: Vec<SocketAddr> = (0..size).map(|i| addr(9000 + i)).collect();

            let mut agents = Vec::new();
            for member in &members {
                let mut config = agent_config(&members, *member, addr(COLLECTOR_PORT));
                config.rounds.maintenance_cycles = cycles;
                config.rounds.start_delay_ms = 300;
                let mut agent = OperatorAgent::new(
                    config,
                    AgentIdentity::generate(),
                    trust_engine(),
                    Arc::new(network.endpoint(*member)),
                )
                .unwrap();
                agent.start();
                agents.push(agent);
            }

            let (stop, stopped) = watch::channel(false);
            let collector =
                ScriptedCollector::new(network.endpoint(addr(COLLECTOR_PORT)), members, subjects)
                    .spawn(stopped);

            for agent in &agents {
                agent.announce().await.unwrap();
            }
            Self {
                agents,
                stop,
                collector,
            }
        }

        async fn run(&self) {
            let results = join_all(self.agents.iter().map(|agent| agent.run())).await;
            for result in results {
                result.unwrap();
            }
        }

        fn lists(&self) -> Vec<Vec<ReputationEntry>> {
            self.agents
                .iter()
                .map(|agent| agent.context().with_state(|s| s.entries.clone()))
                .collect()
        }

        async fn stop(self) {
            self.stop.send(true).unwrap();
            self.collector.await.unwrap();
            for agent in self.agents {
                agent.shutdown().await;
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ring_converges_on_one_list() {
        let good = ScriptedSubject::new(vec![NORMAL_FEATURES.to_vec(), NORMAL_FEATURES.to_vec()]);
        let bad = ScriptedSubject::new(vec![ABNORMAL_FEATURES.to_vec(), ABNORMAL_FEATURES.to_vec()]);
        let quiet = ScriptedSubject::new(vec![]);
        let subjects = vec![good.clone(), bad.clone(), quiet.clone()];

        let ring = Ring::start(3, 2, subjects.clone()).await;
        ring.run().await;

        let lists = ring.lists();
        assert!(lists.iter().all(|list| *list == lists[0]));
        assert_eq!(lists[0].len(), 3);

        let g = ring.agents[0].context().with_state(|s| s.g.unwrap());
        for agent in &ring.agents {
            agent.context().with_state(|s| {
                assert_eq!(s.g, Some(g));
                assert_eq!(s.syncs, 2);
                // genesis, winner, sync, winner
                assert_eq!(s.chain.len(), 4);
                assert_eq!(s.round_status, RoundStatus::Default);
            });
        }

        let score = |subject: &ScriptedSubject| {
            let pseudonym = subject.pseudonym(&g);
            lists[0]
                .iter()
                .find(|e| e.pseudonym == pseudonym)
                .map(|e| e.score)
                .unwrap()
        };
        assert!(score(&good) >= score(&bad));
        for subject in &subjects {
            assert!((0.0..=1.0).contains(&score(subject)));
            // unlinkable to the registration key
            assert_ne!(subject.pseudonym(&g), subject.public_key());
        }

        ring.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_only_first_agent_holds_encrypted_list() {
        let subjects = vec![ScriptedSubject::new(vec![]), ScriptedSubject::new(vec![])];
        let ring = Ring::start(3, 1, subjects).await;
        ring.run().await;

        let encrypted: Vec<usize> = ring
            .agents
            .iter()
            .map(|agent| agent.context().with_state(|s| s.encrypted.len()))
            .collect();
        assert_eq!(encrypted, vec![2, 0, 0]);

        ring.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exactly_one_winner_per_round() {
        let subjects = vec![ScriptedSubject::new(vec![NORMAL_FEATURES.to_vec()])];
        let ring = Ring::start(3, 1, subjects).await;
        ring.run().await;

        let mined: i64 = ring
            .agents
            .iter()
            .map(|agent| agent.context().with_state(|s| s.created_blocks))
            .sum();
        // each agent appends one winner; creators may differ when early blocks
        // were rejected by agents still collecting
        assert!((1..=3).contains(&mined));

        ring.stop().await;
    }
}
