//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use bank_types::{
        Account, AccountStatus, AccountStore, ApiKeyStore, AuthVerifier, CardNumber, DomainError,
        Iban, IdentifierGenerator, MessageLog, MessageLogStore, Money, Payment, PaymentId,
        PaymentStatus, PaymentStore, RepoError, Role, SecretHash, SettlementCommand,
    };

    use crate::{RandomIdentifierGenerator, SqliteRepo};

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn new_account(client: &str) -> Account {
        let (card, iban) = RandomIdentifierGenerator::default().generate(12345);
        Account::open(client.to_string(), 12345, card, iban, SecretHash::new("hash")).unwrap()
    }

    async fn funded_account(repo: &SqliteRepo, client: &str, balance: i64) -> Account {
        let account = repo.create_account(new_account(client)).await.unwrap();
        repo.update_balance(
            &account.card_number,
            Money::zero(),
            Money::new(balance).unwrap(),
        )
        .await
        .unwrap();
        repo.get_by_card(&account.card_number).await.unwrap().unwrap()
    }

    fn payment_from(account: &Account, amount: i64) -> Payment {
        Payment::prepare(
            account,
            Iban::new("UA213223130000026007233566001").unwrap(),
            "Bob".to_string(),
            "rent".to_string(),
            Money::positive(amount).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_account() {
        let repo = setup_repo().await;
        let account = repo.create_account(new_account("Alice")).await.unwrap();

        let by_card = repo.get_by_card(&account.card_number).await.unwrap().unwrap();
        let by_iban = repo.get_by_iban(&account.iban).await.unwrap().unwrap();

        assert_eq!(by_card.id, account.id);
        assert_eq!(by_iban.id, account.id);
        assert_eq!(by_card.client, "Alice");
        assert_eq!(by_card.balance, Money::zero());
        assert_eq!(by_card.status, AccountStatus::Active);
        assert_eq!(by_card.secret_hash, SecretHash::new("hash"));
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let repo = setup_repo().await;
        let card = CardNumber::new("4000000000000002").unwrap();

        assert!(repo.get_by_card(&card).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_card_number_rejected() {
        let repo = setup_repo().await;
        let first = repo.create_account(new_account("Alice")).await.unwrap();

        let mut clash = new_account("Bob");
        clash.card_number = first.card_number.clone();
        let result = repo.create_account(clash).await;

        assert!(matches!(result, Err(RepoError::DuplicateIdentifier(_))));
    }

    #[tokio::test]
    async fn test_update_balance_swaps_expected_value() {
        let repo = setup_repo().await;
        let account = funded_account(&repo, "Alice", 1_000).await;

        repo.update_balance(
            &account.card_number,
            Money::new(1_000).unwrap(),
            Money::new(1_500).unwrap(),
        )
        .await
        .unwrap();

        let fetched = repo.get_by_card(&account.card_number).await.unwrap().unwrap();
        assert_eq!(fetched.balance.amount(), 1_500);
    }

    #[tokio::test]
    async fn test_update_balance_stale_expected_is_conflict() {
        let repo = setup_repo().await;
        let account = funded_account(&repo, "Alice", 1_000).await;

        let result = repo
            .update_balance(
                &account.card_number,
                Money::new(900).unwrap(),
                Money::new(1_100).unwrap(),
            )
            .await;

        assert!(matches!(result, Err(RepoError::BalanceConflict)));
        let fetched = repo.get_by_card(&account.card_number).await.unwrap().unwrap();
        assert_eq!(fetched.balance.amount(), 1_000);
    }

    #[tokio::test]
    async fn test_update_balance_locked_account() {
        let repo = setup_repo().await;
        let account = funded_account(&repo, "Alice", 1_000).await;
        repo.update_status(&account.card_number, AccountStatus::Locked)
            .await
            .unwrap();

        let result = repo
            .update_balance(
                &account.card_number,
                Money::new(1_000).unwrap(),
                Money::new(2_000).unwrap(),
            )
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::AccountLocked))
        ));
    }

    #[tokio::test]
    async fn test_update_balance_unknown_card() {
        let repo = setup_repo().await;
        let card = CardNumber::new("4000000000000002").unwrap();

        let result = repo
            .update_balance(&card, Money::zero(), Money::new(10).unwrap())
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = setup_repo().await;
        let account = repo.create_account(new_account("Alice")).await.unwrap();

        repo.update_status(&account.card_number, AccountStatus::Locked)
            .await
            .unwrap();

        let fetched = repo.get_by_card(&account.card_number).await.unwrap().unwrap();
        assert_eq!(fetched.status, AccountStatus::Locked);
    }

    #[tokio::test]
    async fn test_create_and_get_payment() {
        let repo = setup_repo().await;
        let account = funded_account(&repo, "Alice", 1_000).await;
        let payment = repo.create_payment(payment_from(&account, 250)).await.unwrap();

        let fetched = repo.get_payment(payment.id).await.unwrap().unwrap();

        assert_eq!(fetched.status, PaymentStatus::Prepared);
        assert_eq!(fetched.amount.amount(), 250);
        assert_eq!(fetched.source.client, "Alice");
        assert_eq!(fetched.source.card_number, account.card_number);
        assert_eq!(fetched.to_client, "Bob");
        assert!(repo.get_payment(PaymentId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_sent_twice() {
        let repo = setup_repo().await;
        let account = funded_account(&repo, "Alice", 1_000).await;
        let payment = repo.create_payment(payment_from(&account, 250)).await.unwrap();

        repo.mark_sent(payment.id).await.unwrap();
        let second = repo.mark_sent(payment.id).await;

        assert!(matches!(second, Err(RepoError::AlreadySent)));
        assert!(matches!(
            repo.mark_sent(PaymentId::new()).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_settle_is_atomic() {
        let repo = setup_repo().await;
        let account = funded_account(&repo, "Alice", 1_000).await;
        let payment = repo.create_payment(payment_from(&account, 250)).await.unwrap();

        repo.settle(&SettlementCommand {
            payment_id: payment.id,
            card_number: account.card_number.clone(),
            expected_balance: Money::new(1_000).unwrap(),
            new_balance: Money::new(750).unwrap(),
        })
        .await
        .unwrap();

        let payment = repo.get_payment(payment.id).await.unwrap().unwrap();
        let account = repo.get_by_card(&account.card_number).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Sent);
        assert_eq!(account.balance.amount(), 750);
    }

    #[tokio::test]
    async fn test_settle_rolls_back_on_balance_conflict() {
        let repo = setup_repo().await;
        let account = funded_account(&repo, "Alice", 1_000).await;
        let payment = repo.create_payment(payment_from(&account, 250)).await.unwrap();

        let result = repo
            .settle(&SettlementCommand {
                payment_id: payment.id,
                card_number: account.card_number.clone(),
                expected_balance: Money::new(900).unwrap(),
                new_balance: Money::new(650).unwrap(),
            })
            .await;

        assert!(matches!(result, Err(RepoError::BalanceConflict)));
        let payment = repo.get_payment(payment.id).await.unwrap().unwrap();
        let account = repo.get_by_card(&account.card_number).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Prepared);
        assert_eq!(account.balance.amount(), 1_000);
    }

    #[tokio::test]
    async fn test_settle_rolls_back_on_locked_account() {
        let repo = setup_repo().await;
        let account = funded_account(&repo, "Alice", 1_000).await;
        let payment = repo.create_payment(payment_from(&account, 250)).await.unwrap();
        repo.update_status(&account.card_number, AccountStatus::Locked)
            .await
            .unwrap();

        let result = repo
            .settle(&SettlementCommand {
                payment_id: payment.id,
                card_number: account.card_number.clone(),
                expected_balance: Money::new(1_000).unwrap(),
                new_balance: Money::new(750).unwrap(),
            })
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::AccountLocked))
        ));
        let payment = repo.get_payment(payment.id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Prepared);
    }

    #[tokio::test]
    async fn test_settle_already_sent() {
        let repo = setup_repo().await;
        let account = funded_account(&repo, "Alice", 1_000).await;
        let payment = repo.create_payment(payment_from(&account, 250)).await.unwrap();
        let command = SettlementCommand {
            payment_id: payment.id,
            card_number: account.card_number.clone(),
            expected_balance: Money::new(1_000).unwrap(),
            new_balance: Money::new(750).unwrap(),
        };

        repo.settle(&command).await.unwrap();
        let again = repo
            .settle(&SettlementCommand {
                expected_balance: Money::new(750).unwrap(),
                new_balance: Money::new(500).unwrap(),
                ..command
            })
            .await;

        assert!(matches!(again, Err(RepoError::AlreadySent)));
        let account = repo.get_by_card(&account.card_number).await.unwrap().unwrap();
        assert_eq!(account.balance.amount(), 750);
    }

    #[tokio::test]
    async fn test_message_logs_newest_first() {
        let repo = setup_repo().await;

        repo.append(MessageLog::new("Alice", "first")).await.unwrap();
        repo.append(MessageLog::new("Bob", "other")).await.unwrap();
        repo.append(MessageLog::new("Alice", "second")).await.unwrap();

        let logs = repo.list_for_client("Alice").await.unwrap();
        let messages: Vec<_> = logs.iter().map(|l| l.message.as_str()).collect();

        assert_eq!(messages, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_issue_and_verify_api_key() {
        let repo = setup_repo().await;
        assert_eq!(repo.count_api_keys().await.unwrap(), 0);

        let (key, raw) = repo.issue_api_key("Alice", Role::Client).await.unwrap();

        assert_eq!(key.client, "Alice");
        assert_ne!(key.key_hash, raw);
        assert_eq!(repo.count_api_keys().await.unwrap(), 1);

        let principal = repo.verify(&raw).await.unwrap().unwrap();
        assert_eq!(principal.name, "Alice");
        assert_eq!(principal.role, Role::Client);

        assert!(repo.verify("bk_unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_issue_api_key_empty_client() {
        let repo = setup_repo().await;

        let result = repo.issue_api_key("  ", Role::Admin).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::ValidationError(_)))
        ));
    }
}
