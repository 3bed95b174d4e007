mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::{StandardParties, amount, test_service, test_store};
use kinash::application::AppError;
use kinash::domain::{DebtType, NewParty, NewTransaction, PartyKind};

#[tokio::test]
async fn test_taken_then_given_updates_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, _) = StandardParties::create(&service).await?;

    let tx = service
        .record_transaction(
            NewTransaction::taken(PartyKind::Customer, karim.id, amount(100)),
            false,
        )
        .await?;

    let customer = service.get_party(PartyKind::Customer, karim.id).await?;
    assert_eq!(customer.balance, amount(100));
    assert_eq!(
        customer.transactions.iter().filter(|&&id| id == tx.id).count(),
        1
    );

    service
        .record_transaction(
            NewTransaction::given(PartyKind::Customer, karim.id, amount(50)),
            false,
        )
        .await?;

    let customer = service.get_party(PartyKind::Customer, karim.id).await?;
    assert_eq!(customer.balance, amount(50));
    assert_eq!(customer.transactions.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_transaction_ids_are_monotonic() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, amina, supplier) = StandardParties::create(&service).await?;

    let first = service
        .record_transaction(NewTransaction::taken(PartyKind::Customer, karim.id, amount(10)), false)
        .await?;
    let second = service
        .record_transaction(NewTransaction::taken(PartyKind::Supplier, supplier.id, amount(20)), false)
        .await?;
    let third = service
        .record_transaction(NewTransaction::given(PartyKind::Customer, amina.id, amount(5)), false)
        .await?;

    assert_eq!((first.id, second.id, third.id), (1, 2, 3));
    assert_eq!(service.list_transactions().await?.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_supplier_and_customer_with_same_id_are_separate() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, supplier) = StandardParties::create(&service).await?;
    assert_eq!(karim.id, supplier.id);

    service
        .record_transaction(
            NewTransaction::taken(PartyKind::Supplier, supplier.id, amount(500)),
            false,
        )
        .await?;

    assert_eq!(
        service.get_party(PartyKind::Customer, karim.id).await?.balance,
        amount(0)
    );
    assert_eq!(
        service.get_party(PartyKind::Supplier, supplier.id).await?.balance,
        amount(500)
    );

    Ok(())
}

#[tokio::test]
async fn test_transaction_keeps_date_and_notes() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, _) = StandardParties::create(&service).await?;
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    service
        .record_transaction(
            NewTransaction::taken(PartyKind::Customer, karim.id, "19.90".parse()?)
                .with_date(date)
                .with_notes("sucre et café"),
            false,
        )
        .await?;

    let history = service
        .party_transactions(PartyKind::Customer, karim.id)
        .await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].date, Some(date));
    assert_eq!(history[0].notes.as_deref(), Some("sucre et café"));
    assert_eq!(history[0].debt_type, DebtType::Taken);
    assert_eq!(history[0].amount, "19.90".parse()?);

    Ok(())
}

#[tokio::test]
async fn test_non_positive_amount_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, _) = StandardParties::create(&service).await?;

    for bad in [amount(0), amount(-5)] {
        let result = service
            .record_transaction(NewTransaction::taken(PartyKind::Customer, karim.id, bad), false)
            .await;
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    }
    assert!(service.list_transactions().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_missing_party_rejected_by_default() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .record_transaction(NewTransaction::taken(PartyKind::Customer, 77, amount(10)), false)
        .await;

    assert!(matches!(
        result,
        Err(AppError::PartyNotFound {
            kind: PartyKind::Customer,
            id: 77
        })
    ));
    assert!(service.list_transactions().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_missing_party_allowed_as_orphan() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, _) = StandardParties::create(&service).await?;

    let tx = service
        .record_transaction(NewTransaction::taken(PartyKind::Customer, 77, amount(10)), true)
        .await?;

    assert_eq!(tx.person_id, 77);
    assert_eq!(service.list_transactions().await?.len(), 1);
    // No other party was touched
    let karim = service.get_party(PartyKind::Customer, karim.id).await?;
    assert_eq!(karim.balance, amount(0));
    assert!(karim.transactions.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_store_silently_skips_balance_for_missing_party() -> Result<()> {
    let (store, _temp) = test_store().await?;
    store
        .add_party(PartyKind::Customer, NewParty::new("Karim"))
        .await?;

    let tx = store
        .add_transaction(NewTransaction::given(PartyKind::Customer, 5, amount(25)))
        .await?;

    assert_eq!(tx.id, 1);
    let doc = store.load().await?;
    assert_eq!(doc.transactions.len(), 1);
    assert_eq!(doc.customers[0].balance, amount(0));
    assert!(doc.customers[0].transactions.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_deleted_party_history_survives() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, _) = StandardParties::create(&service).await?;
    service
        .record_transaction(NewTransaction::taken(PartyKind::Customer, karim.id, amount(60)), false)
        .await?;

    service.delete_party(PartyKind::Customer, karim.id).await?;

    let transactions = service.list_transactions().await?;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].person_id, karim.id);

    let report = service.check_integrity().await?;
    assert_eq!(report.orphaned_transactions, vec![transactions[0].id]);

    Ok(())
}

#[tokio::test]
async fn test_new_party_does_not_inherit_deleted_history() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let customer = service
        .create_party(PartyKind::Customer, NewParty::new("Karim"))
        .await?;
    service
        .record_transaction(NewTransaction::taken(PartyKind::Customer, customer.id, amount(100)), false)
        .await?;
    service.delete_party(PartyKind::Customer, customer.id).await?;

    let newcomer = service
        .create_party(PartyKind::Customer, NewParty::new("Amina"))
        .await?;

    let detail = service.get_party_detail(PartyKind::Customer, newcomer.id).await?;
    assert!(detail.transactions.is_empty());

    let report = service.check_integrity().await?;
    assert!(report.balance_mismatches.is_empty());
    assert_eq!(report.orphaned_transactions.len(), 1);

    Ok(())
}
