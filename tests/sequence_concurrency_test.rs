// ==========================================
// 序号计数器并发测试
// ==========================================
// 测试范围: 多连接同时取号时序号不重复、不跳漏
// 说明: 每个线程打开独立的数据库连接（模拟多实例共库），
//       唯一性必须由存储侧的原子自增保证，而非进程内锁
// ==========================================

use std::collections::HashSet;
use std::thread;

use chrono::NaiveDate;
use code_rule_engine::domain::types::SeqResetRule;
use code_rule_engine::repository::sequence_repo::SequenceRepository;
use tempfile::NamedTempFile;

#[test]
fn test_并发取号序号唯一() {
    let temp_file = NamedTempFile::new().expect("创建临时文件失败");
    let db_path = temp_file.path().to_str().unwrap().to_string();

    // 预先建表，避免多连接同时 CREATE TABLE
    SequenceRepository::new(&db_path).expect("创建仓储失败");

    let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let thread_count = 8;
    let per_thread = 25;

    let mut handles = Vec::new();
    for _ in 0..thread_count {
        let db_path = db_path.clone();
        handles.push(thread::spawn(move || {
            // 各线程独立连接: 串行化只能来自 IMMEDIATE 事务 + busy_timeout
            let repo = SequenceRepository::new(&db_path).expect("创建仓储失败");
            let mut values = Vec::with_capacity(per_thread);
            for _ in 0..per_thread {
                let value = repo
                    .next(1, "WS_CODE", date, SeqResetRule::Daily, 1, 1)
                    .expect("取号失败");
                values.push(value);
            }
            values
        }));
    }

    let mut all_values = Vec::new();
    for handle in handles {
        all_values.extend(handle.join().expect("线程异常退出"));
    }

    let total = thread_count * per_thread;
    assert_eq!(all_values.len(), total);

    // 无重复
    let unique: HashSet<i64> = all_values.iter().copied().collect();
    assert_eq!(unique.len(), total);

    // 无跳漏: 恰好覆盖 1..=total
    let max = *all_values.iter().max().unwrap();
    let min = *all_values.iter().min().unwrap();
    assert_eq!(min, 1);
    assert_eq!(max, total as i64);
}

#[test]
fn test_并发下不同桶互不干扰() {
    let temp_file = NamedTempFile::new().expect("创建临时文件失败");
    let db_path = temp_file.path().to_str().unwrap().to_string();

    SequenceRepository::new(&db_path).expect("创建仓储失败");

    let day_a = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let day_b = NaiveDate::from_ymd_opt(2025, 1, 16).unwrap();

    let mut handles = Vec::new();
    for day in [day_a, day_b] {
        let db_path = db_path.clone();
        handles.push(thread::spawn(move || {
            let repo = SequenceRepository::new(&db_path).expect("创建仓储失败");
            (0..20)
                .map(|_| {
                    repo.next(1, "WS_CODE", day, SeqResetRule::Daily, 1, 1)
                        .expect("取号失败")
                })
                .collect::<Vec<i64>>()
        }));
    }

    for handle in handles {
        let values = handle.join().expect("线程异常退出");
        // 每个日桶各自从1连续计到20
        let unique: HashSet<i64> = values.iter().copied().collect();
        assert_eq!(unique.len(), 20);
        assert_eq!(*values.iter().min().unwrap(), 1);
        assert_eq!(*values.iter().max().unwrap(), 20);
    }
}
