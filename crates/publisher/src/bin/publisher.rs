use chrono::Utc;
use database::wkt_codec::polyline_to_wkt;
use database::{DatabaseConnectionInfo, PgDatabase, RoutingDatabase};
use log::{debug, info};
use publisher::config::PublisherConfig;
use publisher::dedup::DedupSet;
use publisher::mqtt::{drive_event_loop, warn_on_publish_failure, ResultMessage, ResultPublisher};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = PublisherConfig::from_env();

    let database_connection_info =
        DatabaseConnectionInfo::from_env().expect("expected database connection info in env.");
    let db = PgDatabase::connect(database_connection_info)
        .await
        .expect("could not connect to database.");

    let (publisher, event_loop) = ResultPublisher::connect(
        &config.mqtt_broker,
        config.mqtt_port,
        config.mqtt_results_topic.clone(),
    );
    tokio::spawn(drive_event_loop(event_loop));

    let mut dedup = DedupSet::new(config.dedup_window);

    info!(
        "publisher polling every {:?}, broker {}:{}",
        config.poll_interval, config.mqtt_broker, config.mqtt_port
    );

    loop {
        let now = Utc::now();
        let since = now - chrono::Duration::seconds(60);

        match db.fetch_fresh_unified_routes(since).await {
            Ok(rows) => {
                for row in rows {
                    let key = (row.client_id.clone(), row.session_id.clone(), row.created_at.timestamp());
                    if !dedup.is_unseen(&key) {
                        continue;
                    }

                    let message = ResultMessage {
                        client_id: row.client_id.clone(),
                        session_id: row.session_id.clone(),
                        stop_id: row.stop_id.clone(),
                        destination: row.destination.into(),
                        route_path: polyline_to_wkt(&row.path),
                        timestamp: row.created_at,
                    };

                    match publisher.publish(&message).await {
                        Ok(()) => {
                            dedup.mark(key, now);
                            debug!("published result for client {}", row.client_id);
                        }
                        Err(why) => warn_on_publish_failure(&row.client_id, &why),
                    }
                }
            }
            Err(why) => {
                log::warn!("failed to fetch fresh unified routes: {why}");
            }
        }

        dedup.evict_expired(now);
        tokio::time::sleep(config.poll_interval).await;
    }
}
