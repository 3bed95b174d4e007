mod common;

use anyhow::Result;
use common::{StandardParties, amount, test_service};
use kinash::application::AppError;
use kinash::domain::{NewParty, NewTransaction, PartyKind, PartyPatch, SettingsPatch};

#[tokio::test]
async fn test_create_and_list_parties() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, amina, supplier) = StandardParties::create(&service).await?;

    let customers = service.list_parties(PartyKind::Customer).await?;
    assert_eq!(customers, vec![karim.clone(), amina.clone()]);
    assert_eq!(service.list_parties(PartyKind::Supplier).await?, vec![supplier]);
    assert_eq!(amina.category.as_deref(), Some("VIP"));
    assert_eq!(karim.phone.as_deref(), Some("0550112233"));

    Ok(())
}

#[tokio::test]
async fn test_empty_name_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .create_party(PartyKind::Customer, NewParty::new("   "))
        .await;
    assert!(matches!(result, Err(AppError::EmptyName)));
    assert!(service.list_parties(PartyKind::Customer).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_update_party() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, _) = StandardParties::create(&service).await?;

    let updated = service
        .update_party(
            PartyKind::Customer,
            karim.id,
            PartyPatch {
                name: Some("Karim B.".into()),
                notes: Some("pays on Fridays".into()),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(updated.name, "Karim B.");
    assert_eq!(updated.notes.as_deref(), Some("pays on Fridays"));
    assert_eq!(updated.phone, karim.phone);

    Ok(())
}

#[tokio::test]
async fn test_update_does_not_touch_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, _) = StandardParties::create(&service).await?;
    service
        .record_transaction(NewTransaction::taken(PartyKind::Customer, karim.id, amount(80)), false)
        .await?;

    let updated = service
        .update_party(
            PartyKind::Customer,
            karim.id,
            PartyPatch {
                phone: Some("0770".into()),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(updated.balance, amount(80));
    assert_eq!(updated.transactions.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_update_missing_party_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardParties::create(&service).await?;
    let before = service.list_parties(PartyKind::Supplier).await?;

    let result = service
        .update_party(
            PartyKind::Supplier,
            9,
            PartyPatch {
                name: Some("X".into()),
                ..Default::default()
            },
        )
        .await;

    match result {
        Err(err) => assert!(err.is_not_found()),
        Ok(_) => panic!("expected not found"),
    }
    assert_eq!(service.list_parties(PartyKind::Supplier).await?, before);

    Ok(())
}

#[tokio::test]
async fn test_empty_patch_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, _) = StandardParties::create(&service).await?;

    let result = service
        .update_party(PartyKind::Customer, karim.id, PartyPatch::default())
        .await;

    assert!(matches!(result, Err(AppError::EmptyUpdate { .. })));
    Ok(())
}

#[tokio::test]
async fn test_delete_party() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, amina, _) = StandardParties::create(&service).await?;

    assert!(service.delete_party(PartyKind::Customer, karim.id).await?);
    assert!(service.delete_party(PartyKind::Customer, karim.id).await?);

    let customers = service.list_parties(PartyKind::Customer).await?;
    assert_eq!(customers, vec![amina]);
    assert!(matches!(
        service.get_party(PartyKind::Customer, karim.id).await,
        Err(AppError::PartyNotFound { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_party_detail() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, amina, _) = StandardParties::create(&service).await?;
    service
        .record_transaction(NewTransaction::taken(PartyKind::Customer, karim.id, amount(10)), false)
        .await?;
    service
        .record_transaction(NewTransaction::taken(PartyKind::Customer, amina.id, amount(20)), false)
        .await?;
    service
        .record_transaction(NewTransaction::given(PartyKind::Customer, karim.id, amount(4)), false)
        .await?;

    let detail = service.get_party_detail(PartyKind::Customer, karim.id).await?;

    assert_eq!(detail.party.balance, amount(6));
    assert_eq!(
        detail.transactions.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![1, 3]
    );
    assert_eq!(detail.party.transactions, vec![1, 3]);

    Ok(())
}

#[tokio::test]
async fn test_categories_and_user() -> Result<()> {
    let (service, _temp) = test_service().await?;

    assert_eq!(service.categories(None).await?.len(), 4);
    let supplier_categories = service.categories(Some(PartyKind::Supplier)).await?;
    assert_eq!(
        supplier_categories.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![3, 4]
    );

    assert_eq!(service.get_user("admin").await?.username, "admin");
    assert!(matches!(
        service.get_user("root").await,
        Err(AppError::UserNotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_update_settings_keeps_other_fields() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let before = service.settings().await?;

    let after = service
        .update_settings(SettingsPatch {
            shop_name: Some("Épicerie du coin".into()),
            hide_balance: Some(true),
            ..Default::default()
        })
        .await?;

    assert_eq!(after.shop_name, "Épicerie du coin");
    assert!(after.hide_balance);
    assert_eq!(after.currency, before.currency);
    assert_eq!(after.trial_end_date, before.trial_end_date);
    assert_eq!(service.settings().await?, after);

    Ok(())
}

#[tokio::test]
async fn test_update_with_blank_value_clears_field() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (karim, _, _) = StandardParties::create(&service).await?;

    let updated = service
        .update_party(
            PartyKind::Customer,
            karim.id,
            PartyPatch {
                phone: Some(String::new()),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(updated.phone, None);
    assert_eq!(updated.name, "Karim");
    let stored = service.get_party(PartyKind::Customer, karim.id).await?;
    assert_eq!(stored.phone, None);

    Ok(())
}
