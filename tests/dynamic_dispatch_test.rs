use cardbank::domain::account::{Account, AccountRecord, Amount};
use cardbank::domain::ports::AccountStoreBox;
use cardbank::infrastructure::in_memory::InMemoryAccountStore;
use std::sync::Arc;

#[tokio::test]
async fn test_store_as_shared_trait_object() {
    let store: Arc<AccountStoreBox> = Arc::new(Box::new(InMemoryAccountStore::new()));

    // Verify Send + Sync by spawning tasks
    let handles: Vec<_> = ["4000009455296122", "4000003305160034"]
        .into_iter()
        .map(|number| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let account = Account::from_record(AccountRecord {
                    id: None,
                    number: number.to_string(),
                    pin: "1234".to_string(),
                    balance: 100,
                });
                store.create(&account).await.unwrap()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort();
    assert_eq!(ids, vec![1, 2]);

    let (sender, receiver) = store
        .transfer(1, 2, Amount::new(30).unwrap())
        .await
        .unwrap();
    assert_eq!(sender.balance.value() + receiver.balance.value(), 200);
    assert_eq!(
        store
            .all()
            .await
            .unwrap()
            .iter()
            .map(|a| a.balance.value())
            .sum::<u64>(),
        200
    );
}
