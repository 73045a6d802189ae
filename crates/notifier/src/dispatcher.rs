//! # メール送信ディスパッチャ
//!
//! インメモリ FIFO キューと単一のバックグラウンドワーカーで構成する。
//! リクエストハンドラは [`EmailDispatcher::enqueue`] でキューに積むだけで即座に返り、
//! SMTP への接続・送信はワーカーだけが行う。
//!
//! ## ライフサイクル
//!
//! - [`start`](EmailDispatcher::start): ワーカーを 1 つだけ起動する（冪等）
//! - [`stop`](EmailDispatcher::stop): 停止シグナルを送り、ワーカーの終了を待つ。
//!   処理中の 1 件は完了させる（協調的キャンセル）。残キューは破棄せず保持し、
//!   次回 `start` 後に処理される
//!
//! ## 配送保証
//!
//! 受理された各メッセージの送信は **最大 1 回** 試行される。
//! 設定解決・接続・送信のいずれで失敗してもログに記録して破棄し、
//! 再キュー・リトライは行わない。キューは永続化されないため、
//! プロセス終了時に残っていたメッセージは失われる（既知の制限）。

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use laptopcare_domain::notification::{EmailAttachment, EmailMessage};
use laptopcare_infra::{MailConfigSource, Mailer};
use tokio::{
    sync::{Notify, watch},
    task::JoinHandle,
    time,
};

/// キューが空のときの待機上限
///
/// 停止シグナルはこの間隔ごとに必ず再確認される。新規投入は
/// [`Notify`] で即座に起床するため、この値は停止応答性にのみ効く。
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// キューエントリ
///
/// 送信待ちメッセージ 1 件。宛先はログ追跡用にメッセージから複製して持つ。
/// ワーカーが取り出した時点でキューから消え、成否を問わず再投入されない。
struct QueueEntry {
    email:     EmailMessage,
    recipient: String,
}

/// 起動中ワーカーのハンドル
struct WorkerHandle {
    join:     JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

/// ワーカーとリクエストハンドラが共有する状態
///
/// キューが両者の唯一の共有可変リソース。エントリは構築後不変のため、
/// キューの内部ロック以外の同期は不要。
struct DispatcherInner {
    queue:         Mutex<VecDeque<QueueEntry>>,
    notify:        Notify,
    mailer:        Arc<dyn Mailer>,
    config_source: Arc<dyn MailConfigSource>,
}

/// メール送信ディスパッチャ
///
/// アプリケーション起動時に構築し、通知を発行するコンポーネントへ
/// 注入して共有する。ワーカーは 1 ディスパッチャにつき最大 1 つ。
pub struct EmailDispatcher {
    inner:         Arc<DispatcherInner>,
    worker:        Mutex<Option<WorkerHandle>>,
    poll_interval: Duration,
}

impl EmailDispatcher {
    /// 新しいディスパッチャを作成する
    ///
    /// # 引数
    ///
    /// - `mailer`: メール送信の実装（SMTP / Noop / モック）
    /// - `config_source`: SMTP 認証情報の取得元。送信試行のたびに解決される
    pub fn new(mailer: Arc<dyn Mailer>, config_source: Arc<dyn MailConfigSource>) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                queue: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
                mailer,
                config_source,
            }),
            worker: Mutex::new(None),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// 待機上限を変更する（テストで停止応答性を上げる用途）
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// バックグラウンドワーカーを起動する
    ///
    /// 既に起動済みの場合は何もしない（冪等）。
    /// Tokio ランタイム上で呼び出すこと。
    pub fn start(&self) {
        let mut worker = self.worker.lock().unwrap();

        if let Some(handle) = worker.as_ref() {
            if !handle.join.is_finished() {
                tracing::debug!("メール送信ワーカーは既に起動済み");
                return;
            }
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(worker_loop(
            Arc::clone(&self.inner),
            shutdown_rx,
            self.poll_interval,
        ));

        *worker = Some(WorkerHandle {
            join,
            shutdown: shutdown_tx,
        });
        tracing::info!("メール送信ワーカーを起動しました");
    }

    /// ワーカーに停止を指示し、終了を待つ
    ///
    /// 処理中の 1 件（待機または送信試行）は完了してから終了する。
    /// 未処理のキューエントリは配送されずキューに残る。
    /// 一度も起動していない場合は何もしない。
    pub async fn stop(&self) {
        let handle = self.worker.lock().unwrap().take();
        let Some(WorkerHandle { join, shutdown }) = handle else {
            return;
        };

        let _ = shutdown.send(true);
        if let Err(e) = join.await {
            tracing::error!(error = %e, "ワーカータスクの終了待機に失敗");
        }

        tracing::info!(
            pending = self.queue_len(),
            "メール送信ワーカーを停止しました"
        );
    }

    /// メッセージを構築してキューに投入する
    ///
    /// ネットワーク I/O は行わず、SMTP の状態に関わらず即座に返る。
    ///
    /// # 戻り値
    ///
    /// キューに受理されたら `true`。メッセージ構築に失敗した場合は
    /// エラーログを出して `false` を返す（呼び出し側へは伝播しない）。
    pub fn enqueue(
        &self,
        subject: &str,
        recipient: &str,
        html_body: &str,
        attachments: Vec<EmailAttachment>,
    ) -> bool {
        match EmailMessage::new(recipient, subject, html_body, None, attachments) {
            Ok(email) => self.enqueue_email(email),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    recipient,
                    "メッセージ構築に失敗したためキュー投入を中止"
                );
                false
            }
        }
    }

    /// 構築済みメッセージをキューに投入する
    ///
    /// テンプレートレンダリング経由など、検証済みの [`EmailMessage`] 用。
    pub fn enqueue_email(&self, email: EmailMessage) -> bool {
        let recipient = email.to.clone();

        self.inner.queue.lock().unwrap().push_back(QueueEntry {
            recipient: recipient.clone(),
            email,
        });
        self.inner.notify.notify_one();

        tracing::info!(recipient = %recipient, "メールをキューに投入しました");
        true
    }

    /// 送信待ちエントリ数を返す
    pub fn queue_len(&self) -> usize {
        self.inner.queue.lock().unwrap().len()
    }
}

/// ワーカーループ
///
/// 停止シグナルを観測するまで繰り返す:
///
/// 1. キュー先頭のエントリを取り出す
/// 2. 空なら次の投入か停止シグナルを [`POLL_INTERVAL`] 上限で待つ
/// 3. エントリがあれば認証情報を解決し、1 通送信して結果をログに記録する
///
/// 1 件の失敗はそのエントリの破棄で完結し、ループは継続する。
async fn worker_loop(
    inner: Arc<DispatcherInner>,
    mut shutdown: watch::Receiver<bool>,
    poll_interval: Duration,
) {
    tracing::info!("メール送信ワーカーのループを開始");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let entry = inner.queue.lock().unwrap().pop_front();
        let Some(entry) = entry else {
            tokio::select! {
                _ = shutdown.changed() => {}
                _ = time::timeout(poll_interval, inner.notify.notified()) => {}
            }
            continue;
        };

        process_entry(&inner, entry).await;
    }

    tracing::info!("メール送信ワーカーのループを終了");
}

/// キューエントリ 1 件を処理する
///
/// 認証情報はエントリごとに解決する（キャッシュしない）。
/// 解決失敗・送信失敗のどちらもログに記録して破棄し、再キューしない。
async fn process_entry(inner: &DispatcherInner, entry: QueueEntry) {
    let credentials = match inner.config_source.resolve() {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!(
                error = %e,
                recipient = %entry.recipient,
                "SMTP 設定を解決できないためメッセージを破棄"
            );
            return;
        }
    };

    match inner.mailer.send(&credentials, &entry.email).await {
        Ok(()) => {
            tracing::info!(recipient = %entry.recipient, "メールを送信しました");
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                recipient = %entry.recipient,
                "メール送信に失敗（破棄、再送なし）"
            );
        }
    }
}
