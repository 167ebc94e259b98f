use messaging::client_link::ClientLink;
use messaging::connection::{Connection, PeerId};
use messaging::dispatch::{ClientMessageHandler, ServerMessageHandler};
use messaging::messages::{ClientMessage, ServerMessage};
use messaging::peer_table::PeerTable;
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, Level};
use transport::config::EndPointConfig;
use transport::end_point::EndPoint;
use transport::memory_pipe::MemoryPipe;
use transport::time::MonotonicClock;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .try_init()
        .ok();
}

struct ServerSide;
impl ClientMessageHandler for ServerSide {
    fn on_message(&mut self, message: ClientMessage) {
        info!("server received {:?}", message);
    }
}

struct ClientSide;
impl ServerMessageHandler for ClientSide {
    fn on_message(&mut self, message: ServerMessage) {
        info!("client received {:?}", message);
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let clock = Rc::new(MonotonicClock::new());
    let config = EndPointConfig::default_in_process();
    let (server_pipe, client_pipe) = MemoryPipe::pair(64 * 1024);

    let mut peers = PeerTable::new();
    peers.insert(Connection::new(
        PeerId(1),
        EndPoint::new(Box::new(server_pipe), clock.clone(), &config)?,
        clock.clone(),
        64 * 1024,
    ));
    let mut client = ClientLink::new(
        EndPoint::new(Box::new(client_pipe), clock.clone(), &config)?,
        64 * 1024,
    );

    let mut server_side = ServerSide;
    let mut client_side = ClientSide;

    client.send(&ClientMessage::Connect);
    client.send(&ClientMessage::Start);

    for tick in 0..3 {
        // client's slice of the tick
        client.drain(&mut client_side)?;
        client.tick();

        // server's slice of the tick
        let connection = peers.get_mut(PeerId(1)).unwrap();
        connection.drain(&mut server_side)?;
        if tick == 0 {
            connection.send(&ServerMessage::InitMap { your_id: 1, width: 100, height: 100 });
            connection.send(&ServerMessage::YourTurn);
        }
        peers.tick_all();

        std::thread::sleep(Duration::from_millis(16));
    }

    info!("client rtt: {} ms, still connected: {}", client.rtt_millis(), client.is_connected());

    Ok(())
}
