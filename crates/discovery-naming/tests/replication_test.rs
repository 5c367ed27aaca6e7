// Integration tests for announcements across replicas
// Each replica answers queries from its own local store

use std::{collections::HashSet, sync::Arc, thread, time::Duration};

use discovery_common::DiscoveryConfig;
use discovery_naming::{
    DynamicAnnouncement, DynamicServiceAnnouncement, DynamicStore, NodeId, ReplicatedDynamicStore,
    Service,
};
use discovery_store::{InMemoryStore, PeerFanout, ReplicatedStore};

struct Replica {
    local: Arc<InMemoryStore>,
    dynamic: ReplicatedDynamicStore,
}

fn cluster(size: usize) -> Vec<Replica> {
    let config = DiscoveryConfig::default();
    let stores: Vec<Arc<InMemoryStore>> = (0..size)
        .map(|_| Arc::new(InMemoryStore::new(&config)))
        .collect();

    stores
        .iter()
        .enumerate()
        .map(|(i, local)| {
            let fanout = Arc::new(PeerFanout::new());
            for (j, peer) in stores.iter().enumerate() {
                if i != j {
                    fanout.add_peer(peer.clone());
                }
            }
            let facade = Arc::new(ReplicatedStore::relayed(local.clone(), fanout));
            Replica {
                local: local.clone(),
                dynamic: ReplicatedDynamicStore::new(facade, &config),
            }
        })
        .collect()
}

fn web_and_db(pool: &str) -> DynamicAnnouncement {
    DynamicAnnouncement::new(pool, "/dc1/rack7")
        .with_service(DynamicServiceAnnouncement::new("web").with_property("http", "http://10.1.1.1:80"))
        .with_service(DynamicServiceAnnouncement::new("db").with_property("jdbc", "jdbc:pg://10.1.1.2"))
}

#[test]
fn test_announcement_is_visible_on_every_replica() {
    let replicas = cluster(3);
    let node_id = NodeId::random();
    let announcement = web_and_db("prod");

    assert!(replicas[0].dynamic.put(node_id, &announcement).unwrap());

    let expected: HashSet<Service> = announcement.to_services(node_id).into_iter().collect();
    for replica in &replicas {
        assert_eq!(replica.dynamic.get_all(), expected);
    }
}

#[test]
fn test_reannouncement_from_another_replica_wins_everywhere() {
    let replicas = cluster(3);
    let node_id = NodeId::random();

    replicas[0].dynamic.put(node_id, &web_and_db("prod")).unwrap();
    thread::sleep(Duration::from_millis(2));
    let moved = DynamicAnnouncement::new("dev", "/dc2/rack1")
        .with_service(DynamicServiceAnnouncement::new("web"));
    replicas[2].dynamic.put(node_id, &moved).unwrap();

    for replica in &replicas {
        let all = replica.dynamic.get_all();
        assert_eq!(all.len(), 1);
        assert!(all.iter().all(|s| s.pool == "dev" && s.location == "/dc2/rack1"));
        assert_eq!(replica.local.len(), 1);
    }
}

#[test]
fn test_delete_propagates() {
    let replicas = cluster(3);
    let node_id = NodeId::random();
    replicas[1].dynamic.put(node_id, &web_and_db("prod")).unwrap();
    thread::sleep(Duration::from_millis(2));

    assert!(replicas[2].dynamic.delete(node_id).unwrap());

    for replica in &replicas {
        assert!(replica.dynamic.get_all().is_empty());
    }
}

#[test]
fn test_queries_span_nodes_and_pools() {
    let replicas = cluster(2);
    let prod_node = NodeId::random();
    let dev_node = NodeId::random();
    replicas[0].dynamic.put(prod_node, &web_and_db("prod")).unwrap();
    replicas[1].dynamic.put(dev_node, &web_and_db("dev")).unwrap();

    for replica in &replicas {
        let web = replica.dynamic.get_by_type("web");
        let pools: HashSet<&str> = web.iter().map(|s| s.pool.as_str()).collect();
        assert_eq!(web.len(), 2);
        assert_eq!(pools, HashSet::from(["prod", "dev"]));

        let web_prod = replica.dynamic.get_by_type_and_pool("web", "prod");
        assert_eq!(web_prod.len(), 1);
        assert!(web_prod.iter().all(|s| s.node_id == prod_node));

        let db_dev = replica.dynamic.get_by_type_and_pool("db", "dev");
        assert_eq!(db_dev.len(), 1);
        assert!(db_dev.iter().all(|s| s.node_id == dev_node));
    }
}

#[test]
fn test_put_reports_local_outcome() {
    // put/delete propagate the local store's change signal instead of always
    // reporting success; a repeated delete is a no-op.
    let replicas = cluster(2);
    let node_id = NodeId::random();

    assert!(replicas[0].dynamic.put(node_id, &web_and_db("prod")).unwrap());
    thread::sleep(Duration::from_millis(2));
    assert!(replicas[0].dynamic.delete(node_id).unwrap());
    assert!(!replicas[0].dynamic.delete(node_id).unwrap());
    assert!(!replicas[1].dynamic.delete(node_id).unwrap());
}
