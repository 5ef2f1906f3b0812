mod common;

use sea_orm::{ConnectionTrait, Statement};

use engine::{EngineError, EntryKind, MoneyCents, Simulator};

use common::{admin, at, engine_with_db, member};

#[tokio::test]
async fn guest_fee_then_adjust_to_zero_appends_one_adjustment() {
    let (engine, _db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;
    let alex = admin(&engine, "Alex").await;

    let booking = engine
        .create_booking(&sam, Simulator::East, at(2), None)
        .await
        .unwrap();
    let fee = engine
        .assess_guest_fee(&sam, booking.id, None, None)
        .await
        .unwrap();
    assert_eq!(fee.amount, MoneyCents::new(2000));
    assert_eq!(fee.booking_id, Some(booking.id));
    assert_eq!(fee.kind, EntryKind::GuestFee);

    let balance = engine.balance(&sam, &sam.user_id).await.unwrap();
    assert_eq!(balance.display, MoneyCents::new(2000));
    assert_eq!(balance.display.to_string(), "$20.00");

    let adjustment = engine
        .adjust_balance_to(&alex, &sam.user_id, MoneyCents::ZERO, "settled at the desk")
        .await
        .unwrap();
    assert_eq!(adjustment.amount, MoneyCents::new(-2000));
    assert_eq!(
        adjustment.description,
        "Balance adjusted from $20.00 to $0.00: settled at the desk"
    );

    let entries = engine.ledger(&alex, &sam.user_id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries
            .iter()
            .filter(|e| e.kind == EntryKind::Adjustment)
            .count(),
        1
    );
    let sum: MoneyCents = entries.iter().map(|e| e.amount).sum();
    assert_eq!(sum, MoneyCents::ZERO);
    assert_eq!(
        engine.balance(&sam, &sam.user_id).await.unwrap().raw,
        MoneyCents::ZERO
    );
}

#[tokio::test]
async fn payment_is_stored_negative() {
    let (engine, _db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;
    let alex = admin(&engine, "Alex").await;

    let payment = engine
        .record_payment(&alex, &sam.user_id, MoneyCents::new(1500))
        .await
        .unwrap();
    assert_eq!(payment.amount, MoneyCents::new(-1500));
    assert_eq!(payment.kind, EntryKind::Payment);

    let balance = engine.balance(&sam, &sam.user_id).await.unwrap();
    assert_eq!(balance.raw, MoneyCents::new(-1500));
    assert_eq!(balance.display, MoneyCents::ZERO);

    let err = engine
        .record_payment(&alex, &sam.user_id, MoneyCents::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn adjustment_targets_the_raw_sum() {
    let (engine, _db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;
    let alex = admin(&engine, "Alex").await;

    engine
        .record_payment(&alex, &sam.user_id, MoneyCents::new(500))
        .await
        .unwrap();
    let adjustment = engine
        .adjust_balance_to(&alex, &sam.user_id, MoneyCents::new(1000), "")
        .await
        .unwrap();
    assert_eq!(adjustment.amount, MoneyCents::new(1500));
    assert_eq!(
        engine.balance(&alex, &sam.user_id).await.unwrap().raw,
        MoneyCents::new(1000)
    );

    let err = engine
        .adjust_balance_to(&alex, &sam.user_id, MoneyCents::new(-1), "")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn ledger_admin_operations_are_forbidden_to_members() {
    let (engine, _db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;
    let kim = member(&engine, "Kim").await;

    assert!(matches!(
        engine
            .record_payment(&sam, &sam.user_id, MoneyCents::new(100))
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine
            .adjust_balance_to(&sam, &sam.user_id, MoneyCents::ZERO, "")
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.balance(&sam, &kim.user_id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.ledger(&sam, &kim.user_id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.all_balances(&sam).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn guest_fee_belongs_to_the_booking_owner() {
    let (engine, _db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;
    let kim = member(&engine, "Kim").await;
    let alex = admin(&engine, "Alex").await;

    let booking = engine
        .create_booking(&sam, Simulator::West, at(2), None)
        .await
        .unwrap();

    let err = engine
        .assess_guest_fee(&kim, booking.id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // a stranger naming themselves learns nothing about the owner
    let err = engine
        .assess_guest_fee(&kim, booking.id, Some(&kim.user_id), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .assess_guest_fee(&alex, booking.id, Some(&kim.user_id), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .assess_guest_fee(&sam, booking.id, None, Some(MoneyCents::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let fee = engine
        .assess_guest_fee(&alex, booking.id, Some(&sam.user_id), None)
        .await
        .unwrap();
    assert_eq!(fee.user_id, sam.user_id);
    assert_eq!(fee.created_by, alex.user_id);
}

#[tokio::test]
async fn members_remove_only_their_own_guest_fees() {
    let (engine, _db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;
    let kim = member(&engine, "Kim").await;
    let alex = admin(&engine, "Alex").await;

    let booking = engine
        .create_booking(&sam, Simulator::East, at(2), None)
        .await
        .unwrap();
    let fee = engine
        .assess_guest_fee(&sam, booking.id, None, None)
        .await
        .unwrap();
    let payment = engine
        .record_payment(&alex, &sam.user_id, MoneyCents::new(700))
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_ledger_entry(&kim, fee.id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.delete_ledger_entry(&sam, payment.id).await,
        Err(EngineError::Forbidden(_))
    ));

    let removed = engine.delete_ledger_entry(&sam, fee.id).await.unwrap();
    assert_eq!(removed.id, fee.id);
    engine.delete_ledger_entry(&alex, payment.id).await.unwrap();
    assert!(engine.ledger(&sam, &sam.user_id).await.unwrap().is_empty());

    assert!(matches!(
        engine.delete_ledger_entry(&alex, fee.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn all_balances_lists_only_debtors() {
    let (engine, _db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;
    let kim = member(&engine, "Kim").await;
    let alex = admin(&engine, "Alex").await;

    let booking = engine
        .create_booking(&sam, Simulator::East, at(2), None)
        .await
        .unwrap();
    engine
        .assess_guest_fee(&sam, booking.id, None, None)
        .await
        .unwrap();
    engine
        .record_payment(&alex, &kim.user_id, MoneyCents::new(300))
        .await
        .unwrap();

    let balances = engine.all_balances(&alex).await.unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].user_id, sam.user_id);
    assert_eq!(balances[0].raw, MoneyCents::new(2000));
}

#[tokio::test]
async fn guest_fees_lists_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;
    let alex = admin(&engine, "Alex").await;

    let booking = engine
        .create_booking(&sam, Simulator::East, at(2), None)
        .await
        .unwrap();
    let first = engine
        .assess_guest_fee(&sam, booking.id, None, None)
        .await
        .unwrap();
    let second = engine
        .assess_guest_fee(&sam, booking.id, None, Some(MoneyCents::new(500)))
        .await
        .unwrap();
    engine
        .record_payment(&alex, &sam.user_id, MoneyCents::new(100))
        .await
        .unwrap();

    let fees = engine.guest_fees(&sam, &sam.user_id).await.unwrap();
    assert_eq!(
        fees.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
}

#[tokio::test]
async fn oversized_guest_fees_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;

    let booking = engine
        .create_booking(&sam, Simulator::East, at(2), None)
        .await
        .unwrap();
    for _ in 0..2 {
        let err = engine
            .assess_guest_fee(&sam, booking.id, None, Some(MoneyCents::new(i64::MAX)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    let balance = engine.balance(&sam, &sam.user_id).await.unwrap();
    assert_eq!(balance.raw, MoneyCents::ZERO);
}

#[tokio::test]
async fn out_of_range_ledger_sum_is_an_error() {
    let (engine, db) = engine_with_db().await;
    let sam = member(&engine, "Sam").await;
    let alex = admin(&engine, "Alex").await;

    let backend = db.get_database_backend();
    for _ in 0..2 {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO ledger_entries \
             (user_id, kind, amount_minor, description, created_at, created_by) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                sam.user_id.clone().into(),
                "adjustment".into(),
                i64::MAX.into(),
                "imported".into(),
                "2030-01-01 10:00:00+00:00".into(),
                alex.user_id.clone().into(),
            ],
        ))
        .await
        .unwrap();
    }

    assert!(matches!(
        engine.balance(&sam, &sam.user_id).await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine.all_balances(&alex).await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine.record_payment(&alex, &sam.user_id, MoneyCents::new(100)).await,
        Err(EngineError::Validation(_))
    ));
}
