#[cfg(test)]
mod tests {
    use crate::instance::{Error, Role, Status};
    use crate::module::Module;

    use async_trait::async_trait;
    use log::Logger;
    use net::Connection;
    use register::{Bank, RegisterValue};
    use std::time::Duration;
    use tokio::time::Instant;

    fn endpoint(port: u16) -> net::Config {
        net::Config {
            ip: "127.0.0.1".to_owned(),
            port,
            timeout_ms: 1000,
        }
    }

    fn words(values: &[u16]) -> Vec<RegisterValue> {
        values.iter().map(|v| RegisterValue::Word(*v)).collect()
    }

    /// Connection that fails for coils and counts up for everything else
    struct Flaky;

    #[async_trait]
    impl Connection for Flaky {
        async fn read(
            &mut self,
            bank: Bank,
            offset: u16,
            count: u16,
        ) -> Result<Vec<RegisterValue>, net::Error> {
            match bank {
                Bank::Coil => Err(net::Error::Transport("link down".to_owned())),
                _ => Ok((offset..offset + count).map(RegisterValue::Word).collect()),
            }
        }

        async fn write(
            &mut self,
            _bank: Bank,
            _offset: u16,
            _values: &[RegisterValue],
        ) -> Result<(), net::Error> {
            Ok(())
        }

        async fn close(&mut self) {}
    }

    #[tokio::test]
    async fn server_write_reaches_store() {
        let mut module = Module::new(Role::Server, endpoint(15020), None, Logger::default());
        module.set_watch(Bank::HoldingRegister, true);
        module.start().await.unwrap();
        assert_eq!(module.instance().status(), Status::Active);

        for row in 0..10 {
            assert!(module.edit(Bank::HoldingRegister, row, (row + 1).to_string()));
        }
        let report = module.write().await.unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.parse_errors, 0);

        let store = module.instance().store().unwrap();
        assert_eq!(
            store.read(Bank::HoldingRegister, 0, 10).unwrap(),
            words(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10])
        );
        assert_eq!(
            store.read(Bank::InputRegister, 0, 10).unwrap(),
            words(&[0; 10])
        );

        module.stop().await;
        assert_eq!(module.instance().status(), Status::Idle);
    }

    #[tokio::test]
    async fn server_start_fills_watched_banks() {
        let log = Logger::default();
        let mut module = Module::new(Role::Server, endpoint(0), None, log.clone());
        module.set_watch(Bank::Coil, true);
        module.start().await.unwrap();

        let coils = module.table().entries(Bank::Coil);
        assert_eq!(coils, vec!["0".to_owned(); 10]);
        assert!(module.table().entries(Bank::HoldingRegister)[0].is_empty());
        assert!(log
            .drain()
            .iter()
            .any(|m| m.message() == "Registers refreshed."));

        module.stop().await;
    }

    #[tokio::test]
    async fn server_poll_follows_interval() {
        let mut module = Module::new(
            Role::Server,
            endpoint(0),
            Some(Duration::from_secs(2)),
            Logger::default(),
        );
        module.set_watch(Bank::InputRegister, true);
        module.start().await.unwrap();

        let mut previous = Instant::now();
        for _ in 0..2 {
            module.poll().wait().await;
            let tick = module.refresh().await.unwrap();
            let now = Instant::now();
            assert!(now - previous >= Duration::from_millis(1990));
            previous = now;

            assert!(tick.failed.is_empty());
            assert_eq!(tick.delivered.len(), 1);
            assert_eq!(tick.values(Bank::InputRegister).unwrap().len(), 10);
            assert!(tick.values(Bank::Coil).is_none());
        }

        module.stop().await;
        assert!(!module.poll().is_armed());
    }

    #[tokio::test]
    async fn server_bind_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut module = Module::new(Role::Server, endpoint(port), None, Logger::default());
        let err = module.start().await.unwrap_err();
        assert!(matches!(err, Error::Bind(_)));
        assert_eq!(module.instance().status(), Status::Idle);
        assert_eq!(module.instance().status_text(), "● Server Failed");
        drop(listener);
    }

    #[tokio::test]
    async fn client_connect_failure() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let log = Logger::default();
        let mut module = Module::new(Role::Client, endpoint(port), None, log.clone());
        let err = module.start().await.unwrap_err();
        assert!(matches!(err, Error::Connect(_)));
        assert_eq!(module.instance().status_text(), "● Failed");
        assert!(log.drain().iter().any(|m| m.is_err()));
    }

    #[tokio::test]
    async fn stop_while_idle() {
        let log = Logger::default();
        let mut module = Module::new(Role::Client, endpoint(502), None, log.clone());
        module.stop().await;
        assert_eq!(module.instance().status(), Status::Idle);
        assert!(log.drain().is_empty());
        assert!(module.refresh().await.is_none());
        assert!(matches!(
            module.write().await,
            Err(Error::InvalidState(Status::Idle))
        ));
    }

    #[tokio::test]
    async fn client_server_loopback() {
        let mut server = Module::new(Role::Server, endpoint(0), None, Logger::default());
        server.start().await.unwrap();
        let port = server.instance().local_addr().unwrap().port();

        let mut client = Module::new(Role::Client, endpoint(port), None, Logger::default());
        client.set_window(Bank::HoldingRegister, 5, 3).unwrap();
        client.apply().unwrap();
        client.set_watch(Bank::HoldingRegister, true);
        client.set_watch(Bank::DiscreteInput, true);
        client.start().await.unwrap();
        assert_eq!(client.instance().status_text(), "● Connected");

        for (row, text) in ["7", "8", "9"].into_iter().enumerate() {
            client.edit(Bank::HoldingRegister, row, text);
        }
        let report = client.write().await.unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 1);

        let store = server.instance().store().unwrap();
        assert_eq!(
            store.read(Bank::HoldingRegister, 5, 3).unwrap(),
            words(&[7, 8, 9])
        );

        let tick = client.refresh().await.unwrap();
        assert!(tick.failed.is_empty());
        assert_eq!(
            tick.values(Bank::HoldingRegister).unwrap(),
            words(&[7, 8, 9]).as_slice()
        );
        assert_eq!(
            tick.values(Bank::DiscreteInput).unwrap(),
            vec![RegisterValue::Bit(false); 10].as_slice()
        );

        client.stop().await;
        server.stop().await;
    }

    #[tokio::test]
    async fn failing_bank_does_not_stop_tick() {
        let log = Logger::default();
        let mut module = Module::new(Role::Client, endpoint(502), None, log.clone());
        module.set_watch(Bank::Coil, true);
        module.set_watch(Bank::HoldingRegister, true);
        module.attach(Box::new(Flaky), "mock").unwrap();

        let tick = module.refresh().await.unwrap();
        assert_eq!(tick.failed, vec![Bank::Coil]);
        assert_eq!(
            tick.values(Bank::HoldingRegister).unwrap(),
            words(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]).as_slice()
        );
        assert_eq!(*module.table().rows(Bank::HoldingRegister)[3].text(), "3");
        assert!(log.drain().iter().any(|m| m.is_err()));
    }

    #[tokio::test]
    async fn unwatched_banks_are_not_written() {
        let mut module = Module::new(Role::Server, endpoint(0), None, Logger::default());
        module.start().await.unwrap();
        module.edit(Bank::HoldingRegister, 0, "42");

        let report = module.write().await.unwrap();
        assert_eq!(report.attempted, 0);
        let store = module.instance().store().unwrap();
        assert_eq!(
            store.read(Bank::HoldingRegister, 0, 1).unwrap(),
            words(&[0])
        );
        module.stop().await;
    }

    #[tokio::test]
    async fn invalid_entries_write_zero() {
        let mut module = Module::new(Role::Server, endpoint(0), None, Logger::default());
        module.set_window(Bank::HoldingRegister, 0, 3).unwrap();
        module.apply().unwrap();
        module.set_watch(Bank::HoldingRegister, true);
        module.start().await.unwrap();

        for (row, text) in ["5", "abc", "70000"].into_iter().enumerate() {
            module.edit(Bank::HoldingRegister, row, text);
        }
        let report = module.write().await.unwrap();
        assert_eq!(report.parse_errors, 2);
        assert_eq!(report.succeeded, 1);

        let store = module.instance().store().unwrap();
        assert_eq!(
            store.read(Bank::HoldingRegister, 0, 3).unwrap(),
            words(&[5, 0, 0])
        );
        let errors = module
            .table()
            .rows(Bank::HoldingRegister)
            .iter()
            .map(|c| *c.error())
            .collect::<Vec<_>>();
        assert_eq!(errors, vec![false, true, true]);
        module.stop().await;
    }

    #[tokio::test]
    async fn configuration_locked_while_active() {
        let mut module = Module::new(Role::Server, endpoint(0), None, Logger::default());
        module.start().await.unwrap();

        assert!(matches!(
            module.set_role(Role::Client),
            Err(Error::InvalidState(Status::Active))
        ));
        assert!(matches!(
            module.set_window(Bank::Coil, 1, 1),
            Err(Error::InvalidState(Status::Active))
        ));
        assert!(matches!(
            module.set_port(1502),
            Err(Error::InvalidState(Status::Active))
        ));
        assert!(matches!(
            module.set_interval(None),
            Err(Error::InvalidState(Status::Active))
        ));
        assert_eq!(module.instance().role(), Role::Server);

        module.stop().await;
        module.set_role(Role::Client).unwrap();
        assert_eq!(module.instance().role(), Role::Client);
    }
}
